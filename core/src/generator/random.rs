use super::*;

/// Purely random placement: `bombs` independent draws with replacement.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBombGenerator {
    seed: u64,
}

impl RandomBombGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.resolved_seed())
    }
}

impl BombGenerator for RandomBombGenerator {
    fn generate(self, config: &BoardConfig) -> Result<BombLayout> {
        use rand::prelude::*;

        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut layout = BombLayout::empty(config.size());
        for _ in 0..config.bombs {
            let row = rng.random_range(0..config.height);
            let column = rng.random_range(0..config.width);
            layout.place(Position::new(row, column))?;
        }

        if layout.risk_count() != config.bombs {
            log::warn!(
                "Duplicate draws reduced bomb count, actual: {}, requested: {}",
                layout.risk_count(),
                config.bombs
            );
        }
        log::debug!(
            "placed {} bombs on {}x{} with seed {}",
            layout.risk_count(),
            config.height,
            config.width,
            self.seed
        );
        Ok(layout)
    }
}
