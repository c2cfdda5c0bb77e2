//! Layout configuration

/// Primary flow direction of the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ranks stack top to bottom
    #[default]
    Down,
    /// Ranks run left to right
    Right,
}

/// Placement algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Layered placement: rank assignment, crossing-reduction ordering,
    /// spaced coordinates
    #[default]
    Layered,
    /// Simple square grid in declaration order, for dense unconnected sets
    Grid,
}

/// Configuration for the layout adapter
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub algorithm: Algorithm,
    /// Spacing between neighbors within a rank
    pub node_spacing: f64,
    /// Spacing between consecutive ranks
    pub rank_spacing: f64,
    /// Padding around group bounding boxes
    pub group_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Down,
            algorithm: Algorithm::Layered,
            node_spacing: 180.0,
            rank_spacing: 140.0,
            group_padding: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_node_spacing(mut self, spacing: f64) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_rank_spacing(mut self, spacing: f64) -> Self {
        self.rank_spacing = spacing;
        self
    }

    pub fn with_group_padding(mut self, padding: f64) -> Self {
        self.group_padding = padding;
        self
    }
}
