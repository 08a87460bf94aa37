//! Regulatory watch: turns a company profile into research questions, runs
//! them through the fiscal agent, and stores the findings as info alerts.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use vigil_model::{
    CompanySettings, InfoAlertId, InfoAlertRecord, WatchPriority, WatchStatus,
};

use crate::agents::{AgentAnswer, AgentError, AgentSource, FiscalAgentClient};
use crate::error::{CoreError, Result};
use crate::store::ports::{InfoAlertsRepository, SettingsRepository};

/// Findings keep a bounded excerpt of the agent's full answer.
const MESSAGE_EXCERPT_CHARS: usize = 300;

pub struct WatchAnalyzer {
    settings: Arc<dyn SettingsRepository>,
    info_alerts: Arc<dyn InfoAlertsRepository>,
    agent: FiscalAgentClient,
}

impl std::fmt::Debug for WatchAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchAnalyzer").finish_non_exhaustive()
    }
}

impl WatchAnalyzer {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        info_alerts: Arc<dyn InfoAlertsRepository>,
        agent: FiscalAgentClient,
    ) -> Self {
        Self {
            settings,
            info_alerts,
            agent,
        }
    }

    /// Run one analysis pass for a company. Per-question agent failures are
    /// tolerated; the pass returns whatever findings it could store.
    pub async fn run(&self, company_id: &str) -> Result<Vec<InfoAlertRecord>> {
        let settings =
            self.settings.get(company_id).await?.ok_or_else(|| {
                CoreError::not_found(format!(
                    "settings for company {company_id}"
                ))
            })?;

        let mut created = Vec::new();
        for question in analysis_questions(&settings) {
            let answer = match self.agent.ask(&question).await {
                Ok(answer) => answer,
                Err(AgentError::Timeout) => {
                    warn!(question, "agent timed out, skipping question");
                    continue;
                }
                Err(err) => {
                    warn!(question, error = %err, "agent query failed");
                    continue;
                }
            };

            if answer.documents_found == 0 {
                continue;
            }

            for source in &answer.sources {
                let record = finding_from_source(
                    company_id, &settings, &question, &answer, source,
                );
                self.info_alerts.insert(&record).await?;
                created.push(record);
            }
        }

        info!(
            company_id,
            findings = created.len(),
            "regulatory watch analysis completed"
        );
        Ok(created)
    }
}

/// The three research questions derived from a company profile.
pub fn analysis_questions(settings: &CompanySettings) -> [String; 3] {
    [
        format!("New VAT regulations for the {} sector", settings.sector),
        format!(
            "Corporate tax changes under the {} regime",
            settings.tax_regime
        ),
        format!(
            "Filing obligations for {} companies",
            settings.legal_form
        ),
    ]
}

fn finding_from_source(
    company_id: &str,
    settings: &CompanySettings,
    question: &str,
    answer: &AgentAnswer,
    source: &AgentSource,
) -> InfoAlertRecord {
    let title = if source.title.is_empty() {
        question.to_string()
    } else {
        source.title.clone()
    };

    InfoAlertRecord {
        id: InfoAlertId::new(),
        company_id: company_id.to_string(),
        user_id: settings.user_id,
        title,
        message: excerpt(&answer.answer, MESSAGE_EXCERPT_CHARS),
        source: source.url.clone(),
        priority: WatchPriority::from_score(source.score),
        status: WatchStatus::Unread,
        detected_at: Utc::now(),
        read_at: None,
        metadata: json!({
            "relevance_score": source.score,
            "origin_question": question,
        }),
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> CompanySettings {
        CompanySettings {
            company_id: "acme".to_string(),
            user_id: None,
            sector: "logistics".to_string(),
            tax_regime: "standard".to_string(),
            legal_form: "LLC".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn questions_carry_the_company_profile() {
        let questions = analysis_questions(&sample_settings());
        assert_eq!(questions.len(), 3);
        assert!(questions[0].contains("logistics"));
        assert!(questions[1].contains("standard"));
        assert!(questions[2].contains("LLC"));
    }

    #[test]
    fn finding_maps_score_to_priority_and_truncates() {
        let answer = AgentAnswer {
            answer: "x".repeat(1000),
            documents_found: 1,
            sources: Vec::new(),
        };
        let hot = AgentSource {
            title: "Directive update".to_string(),
            url: "https://example.org/directive".to_string(),
            score: 0.9,
        };
        let finding = finding_from_source(
            "acme",
            &sample_settings(),
            "question",
            &answer,
            &hot,
        );
        assert_eq!(finding.priority, WatchPriority::High);
        assert_eq!(finding.status, WatchStatus::Unread);
        assert_eq!(finding.message.chars().count(), 300);
        assert_eq!(finding.title, "Directive update");

        let tepid = AgentSource {
            title: String::new(),
            url: String::new(),
            score: 0.3,
        };
        let finding = finding_from_source(
            "acme",
            &sample_settings(),
            "question",
            &answer,
            &tepid,
        );
        assert_eq!(finding.priority, WatchPriority::Medium);
        // Untitled sources fall back to the originating question.
        assert_eq!(finding.title, "question");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo");
        assert_eq!(excerpt("short", 300), "short");
    }
}
