pub mod use_cases;

pub use use_cases::catalog::{CatalogOutcome, CatalogUseCase, Scope};
pub use use_cases::intake::{
    ConsultationIntakeUseCase, ConsultationRequest, LeadIntakeUseCase, LeadRequest,
};
