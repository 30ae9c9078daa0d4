#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    Query,
    #[default]
    Grid,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Query => Focus::Grid,
            Focus::Grid => Focus::Query,
        }
    }
}
