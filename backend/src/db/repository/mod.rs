//! Repository trait definitions for database operations.
//!
//! Storage is split across focused traits so that backends and test doubles
//! can be written against the part they need.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`shift`]: CRUD and filtered listing for shifts
//! - [`shift_helper`]: Volunteer sign-ups, unique per account and shift
//! - [`organization`]: Contact persons, facilities, workplaces, tasks and accounts
//!
//! # Trait Composition
//!
//! A complete repository implementation implements all three traits:
//!
//! ```ignore
//! impl ShiftRepository for MyRepo { ... }
//! impl ShiftHelperRepository for MyRepo { ... }
//! impl OrganizationRepository for MyRepo { ... }
//! ```
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn staff<R: FullRepository>(repo: &R, shift: NewShift, user: UserAccountId) -> RepositoryResult<()> {
//!     let shift = repo.store_shift(shift).await?;
//!     repo.join_shift(user, shift.id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod organization;
pub mod shift;
pub mod shift_helper;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use organization::OrganizationRepository;
pub use shift::{ShiftFilter, ShiftRepository};
pub use shift_helper::ShiftHelperRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all three
/// repository traits.
pub trait FullRepository: ShiftRepository + ShiftHelperRepository + OrganizationRepository {}

impl<T> FullRepository for T where T: ShiftRepository + ShiftHelperRepository + OrganizationRepository
{}
