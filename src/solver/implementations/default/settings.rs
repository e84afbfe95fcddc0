use crate::solver::core::bnb::{BranchingRule, NodeSelection};
use crate::solver::core::traits::Settings;
use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard-form solver type implementing the [`Settings`](crate::solver::core::traits::Settings) trait

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of active-set iterations, shared by all nodes
    #[builder(default = "1000")]
    pub max_iter: u32,

    ///maximum number of branch-and-bound nodes processed
    #[builder(default = "100000")]
    pub max_nodes: u32,

    ///tolerance on constraint violation
    #[builder(default = "(1e-6).as_T()")]
    pub primal_tol: T,

    ///tolerance on multiplier sign violation
    #[builder(default = "(1e-12).as_T()")]
    pub dual_tol: T,

    ///pivots below this value are treated as singular
    #[builder(default = "(1e-11).as_T()")]
    pub zero_tol: T,

    ///a binary constraint within this distance of a bound is integral
    #[builder(default = "(1e-6).as_T()")]
    pub int_tol: T,

    ///objective cutoff: solutions with larger objective are discarded
    #[builder(default = "T::infinity()")]
    pub fval_bound: T,

    ///slack weight of soft constraints: smaller values penalize
    ///violation more
    #[builder(default = "(1e-6).as_T()")]
    pub rho_soft: T,

    ///proximal-point regularization ε.  Zero disables the outer
    ///iterations and requires a positive definite cost.  Fixed at setup.
    #[builder(default = "T::zero()")]
    pub eps_prox: T,

    ///proximal-point iterations stop once successive points are this close
    #[builder(default = "(1e-6).as_T()")]
    pub eta_prox: T,

    ///choice of branching constraint
    #[builder(default = "BranchingRule::FirstFractional")]
    pub branching_rule: BranchingRule,

    ///order of node exploration
    #[builder(default = "NodeSelection::DepthFirst")]
    pub node_selection: NodeSelection,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    //NB: CoreSettings is typedef'd to DefaultSettings
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }

    /// Checks that the settings are valid: tolerances must be positive and
    /// limits nonzero.
    fn validate(&self) -> Result<(), SettingsError> {
        validate_positive("primal_tol", self.primal_tol)?;
        validate_positive("dual_tol", self.dual_tol)?;
        validate_positive("zero_tol", self.zero_tol)?;
        validate_positive("int_tol", self.int_tol)?;
        validate_positive("rho_soft", self.rho_soft)?;
        validate_nonnegative("eps_prox", self.eps_prox)?;
        validate_positive("eta_prox", self.eta_prox)?;
        validate_nonzero("max_iter", self.max_iter)?;
        validate_nonzero("max_nodes", self.max_nodes)?;
        if self.fval_bound.is_nan() {
            return Err(SettingsError::BadFieldValue {
                field: "fval_bound",
                reason: "must not be NaN",
            });
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check the fields that have been set explicitly
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.primal_tol {
            validate_positive("primal_tol", v)?;
        }
        if let Some(v) = self.dual_tol {
            validate_positive("dual_tol", v)?;
        }
        if let Some(v) = self.zero_tol {
            validate_positive("zero_tol", v)?;
        }
        if let Some(v) = self.int_tol {
            validate_positive("int_tol", v)?;
        }
        if let Some(v) = self.rho_soft {
            validate_positive("rho_soft", v)?;
        }
        if let Some(v) = self.eps_prox {
            validate_nonnegative("eps_prox", v)?;
        }
        if let Some(v) = self.eta_prox {
            validate_positive("eta_prox", v)?;
        }
        if let Some(v) = self.max_iter {
            validate_nonzero("max_iter", v)?;
        }
        if let Some(v) = self.max_nodes {
            validate_nonzero("max_nodes", v)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_positive<T: FloatT>(field: &'static str, v: T) -> Result<(), SettingsError> {
    // also rejects NaN
    if v > T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue {
            field,
            reason: "must be positive",
        })
    }
}

fn validate_nonnegative<T: FloatT>(field: &'static str, v: T) -> Result<(), SettingsError> {
    if v >= T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue {
            field,
            reason: "must be finite and nonnegative",
        })
    }
}

fn validate_nonzero(field: &'static str, v: u32) -> Result<(), SettingsError> {
    if v > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue {
            field,
            reason: "must be nonzero",
        })
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = DefaultSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings.max_iter, 1000);
    assert_eq!(settings.max_nodes, 100000);
    assert_eq!(settings.zero_tol, 1e-11);
    assert_eq!(settings.fval_bound, f64::INFINITY);
    assert_eq!(settings.rho_soft, 1e-6);
    assert_eq!(settings.eps_prox, 0.);
    assert_eq!(settings.branching_rule, BranchingRule::FirstFractional);
    assert_eq!(settings.node_selection, NodeSelection::DepthFirst);
    assert!(!settings.verbose);

    // fail on bad tolerances and limits
    assert!(DefaultSettingsBuilder::<f64>::default()
        .zero_tol(0.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .primal_tol(-1e-6)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_nodes(0u32)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .eps_prox(-1.)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .eps_prox(1e-3)
        .rho_soft(1e-4)
        .build()
        .is_ok());

    // directly construct a bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        int_tol: f64::NAN,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue {
            field: "int_tol",
            reason: "must be positive"
        })
    );

    let settings = DefaultSettings::<f64> {
        node_selection: NodeSelection::BestBound,
        branching_rule: BranchingRule::MostFractional,
        ..DefaultSettings::default()
    };
    assert!(settings.validate().is_ok());

    let settings = DefaultSettings::<f64> {
        eps_prox: f64::NAN,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue {
            field: "eps_prox",
            reason: "must be finite and nonnegative"
        })
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_serde() {
    let settings = DefaultSettings::<f64> {
        max_nodes: 17,
        node_selection: NodeSelection::BestBound,
        // json has no infinity
        fval_bound: 1e3,
        ..DefaultSettings::default()
    };
    let json = serde_json::to_string(&settings).unwrap();
    let back: DefaultSettings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(settings, back);
}
