use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("output error")]
    Io(#[from] std::io::Error),

    #[error("grid needs at least one point")]
    NoPoints,

    #[error("domain [{lower}, {upper}] is empty or not finite")]
    EmptyDomain { lower: f64, upper: f64 },

    #[error("{ghost_cells} ghost cell(s) per side do not fit in {steps} point(s)")]
    TooManyGhostCells { ghost_cells: usize, steps: usize },

    #[error("`{method}` reads {required} neighbour(s) per side but the grid has {provided} ghost cell(s)")]
    NotEnoughGhostCells {
        method: &'static str,
        required: usize,
        provided: usize,
    },

    #[error("Courant number must be positive and finite, got {0}")]
    InvalidCfl(f64),

    #[error("wave speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("time axis would need {0} steps")]
    TooManySteps(f64),

    #[error("field of {len} value(s) cannot hold {ghost_cells} ghost cell(s) per side")]
    FieldTooShort { ghost_cells: usize, len: usize },

    #[error("`{field}` = {value} does not fit in a snapshot header")]
    HeaderOverflow { field: &'static str, value: usize },

    #[error("field has {found} value(s) but the grid has {expected} cell(s)")]
    FieldSize { expected: usize, found: usize },
}
