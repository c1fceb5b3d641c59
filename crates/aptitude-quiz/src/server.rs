/// MCP server for the aptitude quiz.
///
/// Exposes the scoring core as tools:
/// - `list_categories`: Catalog version and categories
/// - `get_questions`: Questions with resolved footnotes
/// - `diagnose`: Score a full answer sheet and recommend a job
/// - `match_profile`: Nearest job for an existing score vector
/// - `list_job_profiles` / `get_job_profile`: Browse the reference table
/// - `wrap_labels`: Wrap arbitrary labels for a chart axis
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use aptitude_core::catalog::Catalog;
use aptitude_core::labels::{LineLimit, WrappedLabel, wrap_labels};
use aptitude_core::mcp_api::{
    CatalogSummaryResponse, CategoryInfo, CategoryScoreInfo, DiagnoseParams, DiagnoseResponse,
    FootnoteInfo, GetJobProfileParams, GetQuestionsParams, JobProfileListResponse,
    JobProfileResponse, MatchProfileParams, MatchProfileResponse, QuestionInfo,
    QuestionListResponse, WrapLabelsParams, WrapLabelsResponse,
};
use aptitude_core::model::{Category, ScoreVector};
use aptitude_core::scorer::{self, best_match};

use crate::config::Config;
use crate::error::AppError;

/// The catalog is loaded once at startup and never written, so it is shared without a lock.
#[derive(Clone)]
pub struct AptitudeQuizServer {
    catalog: Arc<Catalog>,
    config: Config,
    tool_router: ToolRouter<AptitudeQuizServer>,
}

impl AptitudeQuizServer {
    pub fn new(catalog: Catalog, config: Config) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn chart_labels(&self, compact: bool) -> Vec<WrappedLabel> {
        wrap_labels(&self.catalog.category_labels(), self.config.label_limit(compact))
    }

    fn find_category(&self, key: &str) -> Result<&Category, String> {
        self.catalog
            .categories()
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
            .ok_or_else(|| {
                let available: Vec<&str> =
                    self.catalog.categories().iter().map(|c| c.key.as_str()).collect();
                format!(
                    "{}. Available categories: {}",
                    AppError::UnknownCategory(key.to_string()),
                    available.join(", ")
                )
            })
    }

    fn question_infos(&self, category: &Category) -> Vec<QuestionInfo> {
        category
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| QuestionInfo {
                id: format!("{}-{index}", category.key),
                category: category.key.clone(),
                index,
                number: index + 1,
                text: question.text().to_string(),
                footnotes: question
                    .footnotes()
                    .iter()
                    .filter_map(|mark| self.catalog.footnote(mark))
                    .map(|f| FootnoteInfo {
                        mark: f.mark.clone(),
                        text: f.text.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[tool_router]
impl AptitudeQuizServer {
    #[tool(description = "Describe the loaded quiz catalog: version, digest and the ordered categories with their question counts.")]
    async fn list_categories(&self) -> Result<Json<CatalogSummaryResponse>, String> {
        let categories = self
            .catalog
            .categories()
            .iter()
            .map(|c| CategoryInfo {
                key: c.key.clone(),
                label: c.label.clone(),
                question_count: c.question_count(),
            })
            .collect();

        Ok(Json(CatalogSummaryResponse {
            version: self.catalog.version().to_string(),
            title: self.catalog.title().to_string(),
            digest: self.catalog.digest().to_string(),
            question_count: self.catalog.question_count(),
            categories,
        }))
    }

    #[tool(description = "List quiz questions in presentation order, optionally for one category (e.g. 'A1', 'B'). Footnote marks are resolved to their text.")]
    async fn get_questions(
        &self,
        Parameters(params): Parameters<GetQuestionsParams>,
    ) -> Result<Json<QuestionListResponse>, String> {
        let category = params
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let questions = match category {
            Some(key) => self.question_infos(self.find_category(&key)?),
            None => self
                .catalog
                .categories()
                .iter()
                .flat_map(|c| self.question_infos(c))
                .collect(),
        };

        Ok(Json(QuestionListResponse { questions }))
    }

    #[tool(description = "Score a complete yes/no answer sheet and recommend the closest job profile. Every question must be answered; otherwise the unanswered question ids are reported.")]
    async fn diagnose(
        &self,
        Parameters(params): Parameters<DiagnoseParams>,
    ) -> Result<Json<DiagnoseResponse>, String> {
        let sheet = params.answer_sheet();
        let diagnosis = scorer::diagnose(&self.catalog, &sheet)
            .map_err(|e| format!("please answer every question: {e}"))?;

        info!(
            recommended = %diagnosis.outcome,
            distance = ?diagnosis.outcome.distance(),
            "diagnosis completed"
        );

        Ok(Json(DiagnoseResponse {
            scores: diagnosis.scores.values().to_vec(),
            breakdown: diagnosis.breakdown.iter().map(CategoryScoreInfo::from).collect(),
            recommended_job: diagnosis.outcome.name().to_string(),
            matched: diagnosis.outcome.profile().is_some(),
            distance: diagnosis.outcome.distance(),
            chart_labels: self.chart_labels(params.compact.unwrap_or(false)),
        }))
    }

    #[tool(description = "Find the job profile nearest (L1 distance) to a score vector given in catalog category order. Returns 'N/A' when the profile table is empty.")]
    async fn match_profile(
        &self,
        Parameters(params): Parameters<MatchProfileParams>,
    ) -> Result<Json<MatchProfileResponse>, String> {
        let dimension = self.catalog.dimension();
        if params.scores.len() != dimension {
            return Err(format!(
                "expected {dimension} scores (one per category), got {}",
                params.scores.len()
            ));
        }

        let user = ScoreVector::new(params.scores);
        let outcome = best_match(&user, self.catalog.profiles());

        Ok(Json(MatchProfileResponse {
            job: outcome.name().to_string(),
            matched: outcome.profile().is_some(),
            distance: outcome.distance(),
        }))
    }

    #[tool(description = "List job profile names in reference table order.")]
    async fn list_job_profiles(&self) -> Result<Json<JobProfileListResponse>, String> {
        let jobs = self
            .catalog
            .profiles()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        Ok(Json(JobProfileListResponse { jobs }))
    }

    #[tool(description = "Get the idealized skill profile of one job, with per-category scores and wrapped chart labels.")]
    async fn get_job_profile(
        &self,
        Parameters(params): Parameters<GetJobProfileParams>,
    ) -> Result<Json<JobProfileResponse>, String> {
        let job = params.job.trim().to_string();
        if job.is_empty() {
            return Err("job must not be empty".to_string());
        }

        let profile = self.catalog.profile(&job).ok_or_else(|| {
            let available: Vec<&str> =
                self.catalog.profiles().iter().map(|p| p.name.as_str()).collect();
            format!(
                "{}. Available jobs: {}",
                AppError::NotFound(job.clone()),
                available.join(", ")
            )
        })?;

        let suggested_max = self
            .catalog
            .categories()
            .iter()
            .map(Category::question_count)
            .max()
            .unwrap_or(0);

        Ok(Json(JobProfileResponse {
            job: profile.name.clone(),
            scores: profile.scores.values().to_vec(),
            breakdown: scorer::breakdown(&self.catalog, &profile.scores)
                .iter()
                .map(CategoryScoreInfo::from)
                .collect(),
            chart_labels: self.chart_labels(params.compact.unwrap_or(false)),
            suggested_max,
        }))
    }

    #[tool(description = "Wrap labels for a chart axis. Labels within max_length are returned unchanged as strings; longer ones become arrays of lines split at spaces, '・' and parentheses.")]
    async fn wrap_labels(
        &self,
        Parameters(params): Parameters<WrapLabelsParams>,
    ) -> Result<Json<WrapLabelsResponse>, String> {
        let limit = LineLimit::new(params.max_length as usize).map_err(|e| e.to_string())?;
        Ok(Json(WrapLabelsResponse {
            labels: wrap_labels(&params.labels, limit),
        }))
    }
}

#[tool_handler]
impl ServerHandler for AptitudeQuizServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "aptitude-quiz".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Aptitude quiz MCP server. Use list_categories and get_questions to present the \
                 questionnaire, diagnose to score a complete yes/no answer sheet and get the \
                 closest job, match_profile for an existing score vector, get_job_profile to \
                 show a job's ideal profile, and wrap_labels to format chart axis labels."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use aptitude_core::mcp_api::AnswerEntry;
    use aptitude_core::model::Answer;

    use super::*;
    use crate::parser::{BuiltinCatalog, parse_builtin};

    fn server(builtin: BuiltinCatalog) -> AptitudeQuizServer {
        let config = Config::from_lookup(|_| None).unwrap();
        AptitudeQuizServer::new(parse_builtin(builtin).unwrap(), config)
    }

    fn all_answers(catalog: &Catalog, yes: impl Fn(&str) -> bool) -> Vec<AnswerEntry> {
        catalog
            .categories()
            .iter()
            .flat_map(|c| {
                let answer = if yes(&c.key) { Answer::Yes } else { Answer::No };
                (0..c.questions.len()).map(move |index| AnswerEntry {
                    category: c.key.clone(),
                    index,
                    answer,
                })
            })
            .collect()
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = AptitudeQuizServer::tool_router().list_all();
        for name in [
            "list_categories",
            "get_questions",
            "diagnose",
            "match_profile",
            "list_job_profiles",
            "get_job_profile",
            "wrap_labels",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[tokio::test]
    async fn diagnose_recommends_profile_for_complete_sheet() {
        let server = server(BuiltinCatalog::FiveCategory);
        let answers = all_answers(&server.catalog, |_| false);

        let Json(response) = server
            .diagnose(Parameters(DiagnoseParams {
                answers,
                compact: None,
            }))
            .await
            .unwrap();

        assert_eq!(response.scores, vec![0; 5]);
        assert!(response.matched);
        // カスタマーサポート has the smallest score sum in the five-category table.
        assert_eq!(response.recommended_job, "カスタマーサポート");
        assert_eq!(response.distance, Some(10));
        assert_eq!(response.chart_labels.len(), 5);
        assert_eq!(response.breakdown[0].summary, "論理的思考・問題解決力: 0点");
    }

    #[tokio::test]
    async fn diagnose_reports_unanswered_questions() {
        let server = server(BuiltinCatalog::SixCategory);
        let mut answers = all_answers(&server.catalog, |key| key == "B");
        answers.retain(|a| !(a.category == "A2" && a.index == 3));

        let err = server
            .diagnose(Parameters(DiagnoseParams {
                answers,
                compact: Some(true),
            }))
            .await
            .err()
            .expect("tool call should fail");

        assert!(err.contains("A2-3"), "unexpected message: {err}");
    }

    #[tokio::test]
    async fn compact_flag_uses_narrow_label_limit() {
        let server = server(BuiltinCatalog::SixCategory);
        let Json(wide) = server
            .get_job_profile(Parameters(GetJobProfileParams {
                job: "データアナリスト".to_string(),
                compact: None,
            }))
            .await
            .unwrap();
        let Json(narrow) = server
            .get_job_profile(Parameters(GetJobProfileParams {
                job: "データアナリスト".to_string(),
                compact: Some(true),
            }))
            .await
            .unwrap();

        assert_eq!(wide.scores, vec![3, 4, 2, 2, 1, 4]);
        assert_eq!(wide.suggested_max, 4);
        // "問題解決・分析力（データ活用）" is 15 characters.
        assert!(!wide.chart_labels[1].is_wrapped());
        assert!(narrow.chart_labels[1].is_wrapped());
        for label in &narrow.chart_labels {
            assert!(label.lines().iter().all(|l| l.chars().count() <= 10));
        }
    }

    #[tokio::test]
    async fn match_profile_checks_dimension() {
        let server = server(BuiltinCatalog::FiveCategory);
        let err = server
            .match_profile(Parameters(MatchProfileParams {
                scores: vec![1, 2, 3],
            }))
            .await
            .err()
            .expect("tool call should fail");
        assert!(err.contains("expected 5 scores"));

        let Json(response) = server
            .match_profile(Parameters(MatchProfileParams {
                scores: vec![4, 2, 2, 1, 4],
            }))
            .await
            .unwrap();
        assert_eq!(response.job, "データアナリスト");
        assert_eq!(response.distance, Some(0));
    }

    #[tokio::test]
    async fn unknown_lookups_list_alternatives() {
        let server = server(BuiltinCatalog::SixCategory);
        let err = server
            .get_questions(Parameters(GetQuestionsParams {
                category: Some("Z".to_string()),
            }))
            .await
            .err()
            .expect("tool call should fail");
        assert!(err.contains("A1, A2, B, C, D, E"));

        let err = server
            .get_job_profile(Parameters(GetJobProfileParams {
                job: "宇宙飛行士".to_string(),
                compact: None,
            }))
            .await
            .err()
            .expect("tool call should fail");
        assert!(err.starts_with("job profile not found: 宇宙飛行士"));
    }

    #[tokio::test]
    async fn get_questions_resolves_footnotes() {
        let server = server(BuiltinCatalog::SixCategory);
        let Json(response) = server
            .get_questions(Parameters(GetQuestionsParams {
                category: Some("e".to_string()),
            }))
            .await
            .unwrap();

        assert_eq!(response.questions.len(), 4);
        assert_eq!(response.questions[0].id, "E-0");
        assert_eq!(response.questions[0].number, 1);
        assert_eq!(response.questions[0].footnotes[0].mark, "※1");
        assert!(response.questions[1].footnotes.is_empty());

        let Json(all) = server
            .get_questions(Parameters(GetQuestionsParams { category: None }))
            .await
            .unwrap();
        assert_eq!(all.questions.len(), server.catalog.question_count());
    }

    #[tokio::test]
    async fn wrap_labels_rejects_zero_length() {
        let server = server(BuiltinCatalog::SixCategory);
        let err = server
            .wrap_labels(Parameters(WrapLabelsParams {
                labels: vec!["短い".to_string()],
                max_length: 0,
            }))
            .await
            .err()
            .expect("tool call should fail");
        assert!(err.contains("must be positive"));

        let Json(response) = server
            .wrap_labels(Parameters(WrapLabelsParams {
                labels: vec!["短い".to_string()],
                max_length: 16,
            }))
            .await
            .unwrap();
        assert_eq!(response.labels, vec![WrappedLabel::Single("短い".to_string())]);
    }
}
