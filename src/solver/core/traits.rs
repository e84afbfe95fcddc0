//! Traits linking the core solver to a problem format.
//!
//! The core works on an internal least-distance workspace.  A solver
//! implementation supplies its settings through [`Settings`] and its
//! progress output through [`InfoPrint`].  In nearly all cases the types in
//! the [default implementation](crate::solver::implementations::default)
//! are the right choice.

use super::bnb::NodeReport;
use super::{CoreSettings, SettingsError, SolverStatus};
use crate::algebra::*;

/// Printing functions for the solver's Info

pub trait InfoPrint<T>
where
    T: FloatT,
{
    type D;
    type SE: Settings<T>;

    /// Print the solver configuration, e.g. settings etc.
    /// This function is called once at the start of the solve.
    fn print_configuration(&mut self, settings: &Self::SE, data: &Self::D) -> std::io::Result<()>;

    /// Print progress information.  Called once per branch-and-bound node.
    fn print_node(&mut self, settings: &Self::SE, node: &NodeReport<T>) -> std::io::Result<()>;

    /// Print the outcome of one priority level of a hierarchical solve.
    fn print_level(
        &mut self,
        _settings: &Self::SE,
        _level: usize,
        _limit: usize,
        _status: SolverStatus,
    ) -> std::io::Result<()> {
        Ok(())
    }

    /// Print solver final status and other exit information.   Called at
    /// solver termination.
    fn print_footer(&mut self, settings: &Self::SE) -> std::io::Result<()>;
}

/// Settings for a quadratic program.
///
/// Implementors of this trait can define any internal or problem
/// specific settings they wish.   They must, however, also maintain
/// a settings object of type [`CoreSettings`](crate::solver::core::CoreSettings)
/// and return this to the solver internally.

pub trait Settings<T: FloatT> {
    /// Return the core settings.
    fn core(&self) -> &CoreSettings<T>;

    /// Return the core settings (mutably).
    fn core_mut(&mut self) -> &mut CoreSettings<T>;

    /// Check that the settings are valid.
    fn validate(&self) -> Result<(), SettingsError>;
}
