use super::*;

/// Placement from an explicit list of coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixedBombGenerator {
    bombs: Vec<Position>,
}

impl FixedBombGenerator {
    pub fn new(bombs: impl IntoIterator<Item = Position>) -> Self {
        Self {
            bombs: bombs.into_iter().collect(),
        }
    }
}

impl BombGenerator for FixedBombGenerator {
    /// Ignores `config.bombs` and `config.seed`; every listed position is one draw.
    fn generate(self, config: &BoardConfig) -> Result<BombLayout> {
        config.validate()?;

        let mut layout = BombLayout::empty(config.size());
        for position in self.bombs {
            layout.place(position)?;
        }
        Ok(layout)
    }
}
