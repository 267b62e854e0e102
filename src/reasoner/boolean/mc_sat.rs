/*!
Marginals of boolean assignments by Gibbs sampling over blocks.

Each block is set at random, then on each sample every block with a choice of setting is resampled in turn.
A setting is taken with probability proportional to `exp(−e)`, with `e` the energy of the block under the setting.
Energies are shifted by their least value before exponentiation.

After [burn in](crate::config::reasoners::MCSatConfig::burn_in) the value of each variable is accumulated, and the value written is the mean over the remaining samples.
*/

use rand::Rng;

use crate::{
    config::{reasoners::MCSatConfig, Config},
    db::term::TermDB,
    generic::random::SplitMix64,
    misc::log::targets::{self},
    reasoner::{boolean::Blocks, summarise, OptimizationReport, Reasoner},
    reports::Report,
    types::err::{ConfigError, ErrorKind},
};

/// The MC-SAT reasoner.
pub struct MCSat {
    config: MCSatConfig,
    constraint_tolerance: f32,
    rng: SplitMix64,
}

impl MCSat {
    pub fn new(config: &Config, rng: SplitMix64) -> Self {
        MCSat {
            config: config.mcsat.clone(),
            constraint_tolerance: config.stopping.constraint_tolerance.value,
            rng,
        }
    }
}

/// Samples an index with probability proportional to `exp(−energy)`.
fn sample(energies: &[f64], rng: &mut impl Rng) -> usize {
    let least = energies.iter().copied().fold(f64::INFINITY, f64::min);

    let total: f64 = energies.iter().map(|energy| (least - energy).exp()).sum();
    let mut point = rng.random::<f64>() * total;

    for (index, energy) in energies.iter().enumerate() {
        point -= (least - energy).exp();
        if point <= 0.0 {
            return index;
        }
    }
    energies.len() - 1
}

impl Reasoner for MCSat {
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind> {
        let blocks = Blocks::new(terms)?;
        let samples = self.config.samples.value;
        let burn_in = self.config.burn_in.value;

        if burn_in >= samples {
            return Err(ErrorKind::from(ConfigError::OutOfRange(self.config.burn_in.name)));
        }

        let mut state = values.to_vec();
        blocks.randomise(&mut state, &mut self.rng);

        let variables = terms.variables();
        let mut totals = vec![0.0_f64; variables.len()];
        let mut energies = Vec::default();

        log::info!(target: targets::MCSAT, "Sampling {samples} assignments to {} blocks", blocks.blocks.len());

        for iteration in 0..samples {
            for block in blocks.blocks.iter().filter(|block| block.is_free()) {
                energies.clear();
                for setting in block.settings() {
                    block.apply(setting, &mut state);
                    energies.push(block.energy(terms, &state));
                }

                let setting = block.settings().start + sample(&energies, &mut self.rng);
                block.apply(setting, &mut state);
            }

            if iteration >= burn_in {
                for (total, atom) in totals.iter_mut().zip(variables) {
                    *total += state[*atom as usize] as f64;
                }
            }

            log::trace!(target: targets::MCSAT, "Sample {iteration}: loss {}", terms.objective(&state));
        }

        let kept = (samples - burn_in) as f64;
        for (total, atom) in totals.iter().zip(variables) {
            values[*atom as usize] = (total / kept) as f32;
        }

        log::info!(target: targets::MCSAT, "Marginals from {kept} samples");
        Ok(summarise(terms, values, samples, Report::Converged, self.constraint_tolerance))
    }
}

#[cfg(test)]
mod mcsat_tests {
    use super::*;
    use crate::db::{
        term::{Term, TermKind},
        GroundRuleKey,
    };
    use rand::SeedableRng;

    #[test]
    fn sampling_favours_low_energy() {
        let mut rng = SplitMix64::seed_from_u64(3);
        assert_eq!(sample(&[0.0], &mut rng), 0);

        let mut counts = [0; 2];
        for _ in 0..1000 {
            counts[sample(&[0.0, 50.0], &mut rng)] += 1;
        }
        assert_eq!(counts, [1000, 0]);
    }

    #[test]
    fn marginal_of_prior() {
        // A weight of ln(3) on x, so p(x = 1) = 3/4.
        let terms = TermDB::new(vec![Term {
            kind: TermKind::Hinge,
            weight: 3.0_f32.ln(),
            coefficients: vec![-1.0],
            atoms: vec![0],
            constant: -1.0,
            ground_rule: GroundRuleKey::default(),
        }]);

        let mut config = Config::default();
        config.mcsat.samples.value = 20_000;
        config.mcsat.burn_in.value = 100;

        let mut values = vec![0.0];
        let mut mcsat = MCSat::new(&config, SplitMix64::seed_from_u64(11));
        let report = mcsat.optimize(&terms, &mut values).unwrap();

        assert_eq!(report.report, Report::Converged);
        assert_eq!(report.iterations, 20_000);
        assert!((values[0] - 0.75).abs() < 0.03);
    }
}
