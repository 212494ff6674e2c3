use std::sync::Arc;

use crate::application::use_cases::record_normalizer::RecordNormalizer;
use crate::application::{CatalogUseCase, ConsultationIntakeUseCase, LeadIntakeUseCase};
use crate::infrastructure::config::Settings;
use crate::infrastructure::notion::{ContentStore, NotionClient};
use crate::interfaces::http::AppState;
use crate::shared::drive_url::convert_drive_url;

/// Wire the shared state: one API client, one normalizer, and the use
/// cases the HTTP layer dispatches to.
pub fn build_state(settings: &Settings) -> Arc<AppState> {
    let store: Arc<dyn ContentStore> = Arc::new(NotionClient::new(settings.notion_token.clone()));
    let normalizer = Arc::new(RecordNormalizer::with_link_rewriter(Arc::new(|url: &str| {
        convert_drive_url(url)
    })));

    let catalog = CatalogUseCase::new(
        Arc::clone(&store),
        normalizer,
        settings.sale_db.clone(),
        settings.rent_db.clone(),
        settings.single_db.clone(),
    );
    let leads = settings
        .leads_db
        .clone()
        .map(|db| LeadIntakeUseCase::new(Arc::clone(&store), db));
    let consultations = settings
        .consultations_db
        .clone()
        .map(|db| ConsultationIntakeUseCase::new(Arc::clone(&store), db));

    Arc::new(AppState {
        catalog,
        leads,
        consultations,
    })
}
