//! The catalog's concrete conventions.
//!
//! Registration lives in [`catalog_module`]; the model builder discovers
//! and instantiates from there. Priorities encode the only real ordering
//! constraints within the post phase: filter synthesis before navigation
//! combination before public-id sequencing before default values.

mod audit;
mod defaults;
mod ignore_read_only;
mod public_id;
mod row_version;
mod soft_delete;
mod strings;
mod translation;

pub use audit::AuditConvention;
pub use defaults::DefaultValueConvention;
pub use ignore_read_only::IgnoreReadOnlyConvention;
pub use public_id::PublicIdConvention;
pub use row_version::RowVersionConvention;
pub use soft_delete::{SoftDeleteFilterConvention, SoftDeleteNavigationFilterConvention};
pub use strings::StringColumnConvention;
pub use translation::TranslationConvention;

use crate::provider::{ConventionContract, ConventionDescriptor, ConventionModule};

/// Registration module carrying every catalog convention.
#[must_use]
pub fn catalog_module() -> ConventionModule {
    ConventionModule::new("catalog")
        .register(ConventionDescriptor::entity(
            "ignore_read_only",
            ConventionContract::PreModel,
            || Box::new(IgnoreReadOnlyConvention),
        ))
        .register(ConventionDescriptor::entity(
            "audit",
            ConventionContract::PreModel,
            || Box::new(AuditConvention),
        ))
        .register(ConventionDescriptor::entity(
            "row_version",
            ConventionContract::PreModel,
            || Box::new(RowVersionConvention),
        ))
        .register(ConventionDescriptor::entity(
            "translation",
            ConventionContract::PreModel,
            || Box::new(TranslationConvention),
        ))
        .register(ConventionDescriptor::entity(
            "soft_delete_filter",
            ConventionContract::PostModel,
            || Box::new(SoftDeleteFilterConvention),
        ))
        .register(ConventionDescriptor::entity(
            "soft_delete_navigation_filter",
            ConventionContract::PostModel,
            || Box::new(SoftDeleteNavigationFilterConvention),
        ))
        .register(ConventionDescriptor::entity(
            "public_id",
            ConventionContract::PostModel,
            || Box::new(PublicIdConvention),
        ))
        .register(ConventionDescriptor::entity(
            "default_value",
            ConventionContract::PostModel,
            || Box::new(DefaultValueConvention),
        ))
        .register(ConventionDescriptor::type_wide("string_column", || {
            Box::new(StringColumnConvention::new())
        }))
}
