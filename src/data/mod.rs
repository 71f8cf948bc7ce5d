pub mod config;
pub mod loader;
pub mod validate;

pub use config::{build_roster, CombatantTemplate, MatrixConfig, SimulationConfig};
pub use loader::{load_and_validate, load_matrix_config, load_simulation_config, ConfigFormat};
pub use validate::{
    validate_matrix_config, validate_simulation_config, ValidationDiagnostic, ValidationReport,
    ValidationSeverity,
};
