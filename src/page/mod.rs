// src/page/mod.rs
// =============================================================================
// Everything that turns records into page markup.
//
// Submodules:
// - template: instantiates cards from a <template> and renders them
// - card: a single card and its Loading -> Populated state
// - binder: pairs cards with records, removes the leftovers
// - section: one flow's container + alert
// - document: the host page (contract check, final rendering)
// =============================================================================

mod binder;
mod card;
mod document;
mod section;
mod template;

pub use binder::fill_cards;
pub use card::CardContent;
pub use document::HostPage;
pub use section::{PageSections, Section, SectionKind};
pub use template::CardTemplate;
