//! `depthcmp-contract` -- verify the trainer exposes the depth-supervision
//! options the orchestrator relies on, with the expected defaults.

pub mod check;
pub mod trainer;

pub use check::{
    check_defaults, check_overrides, check_trainer_modules, expected_defaults,
    expected_overrides, ContractViolation, OVERRIDE_ARGS, TRAINER_MODULES, USAGE_EXAMPLE,
};
pub use trainer::{
    TrainerCheckError, TrainerCheckout, TrainerOptions, DEFAULT_PYTHON, DEPTH_OPTIONS,
    TRAINER_IMPORTS,
};
