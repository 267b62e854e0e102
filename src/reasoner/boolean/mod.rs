/*!
Reasoners over boolean assignments.

Boolean reasoners assign each variable zero or one, and so constraints are respected by construction, through *blocks* of mutually exclusive variables:
- A constraint `Σx = 1`, with unit coefficients, is an [exactly one](BlockKind::ExactlyOne) block.
- A constraint `Σx ≤ 1`, with unit coefficients, is an [at most one](BlockKind::AtMostOne) block.
- A constraint `Σx ≤ 0` or `Σx = 0`, with unit coefficients, is a [zeroed](BlockKind::Zeroed) block.
- A constraint `Σx ≤ k` with unit coefficients and `k` at least the count of variables always holds, and is ignored.
- Any other variable is a block of its own, which may be either zero or one.

`≥` constraints with coefficients of minus one are read as `≤` constraints with unit coefficients.
Any other constraint is unsupported, as is a variable in two blocks.

A *setting* of a block with `n` variables is an index in `0..=n`, with `i < n` the setting where the `i`th variable is one and `n` the setting where every variable is zero.

The *energy* of a block is the sum of the loss of each weighted term incident to some variable of the block.
*/

pub mod max_walk_sat;
pub mod mc_sat;

use crate::{
    db::{
        term::{TermDB, TermKind},
        AtomIndex,
    },
    generic::numeric,
    structures::comparator::Comparator,
    types::err::{ErrorKind, ReasonerError},
};

/// The kind of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    ExactlyOne,
    AtMostOne,
    Zeroed,
}

/// Mutually exclusive variables.
#[derive(Clone, Debug)]
pub struct Block {
    pub kind: BlockKind,
    pub atoms: Vec<AtomIndex>,

    /// Weighted terms incident to some variable of the block, as indices into the term database.
    pub incident: Vec<usize>,
}

impl Block {
    /// The settings of the block, as a range.
    pub fn settings(&self) -> std::ops::Range<usize> {
        match self.kind {
            BlockKind::ExactlyOne => 0..self.atoms.len(),
            BlockKind::AtMostOne => 0..self.atoms.len() + 1,
            BlockKind::Zeroed => self.atoms.len()..self.atoms.len() + 1,
        }
    }

    /// Whether the block has a choice of setting.
    pub fn is_free(&self) -> bool {
        self.settings().len() > 1
    }

    pub fn apply(&self, setting: usize, values: &mut [f32]) {
        for (index, atom) in self.atoms.iter().enumerate() {
            values[*atom as usize] = match index == setting {
                true => 1.0,
                false => 0.0,
            };
        }
    }

    /// The current setting of the block.
    pub fn setting(&self, values: &[f32]) -> usize {
        self.atoms
            .iter()
            .position(|atom| values[*atom as usize] > 0.5)
            .unwrap_or(self.atoms.len())
    }

    /// Some random setting of the block.
    pub fn random_setting(&self, rng: &mut impl rand::Rng) -> usize {
        rng.random_range(self.settings())
    }

    /// The energy of the block under the given values.
    pub fn energy(&self, terms: &TermDB, values: &[f32]) -> f64 {
        self.incident
            .iter()
            .map(|term| terms.terms()[*term].loss(values))
            .sum()
    }
}

/// The blocks of some terms.
#[derive(Clone, Debug)]
pub struct Blocks {
    pub blocks: Vec<Block>,

    /// The block of each variable, by position in the variables of the term database.
    block_of: Vec<usize>,
}

impl Blocks {
    /// The blocks of the terms, or an error if some constraint does not define a block.
    pub fn new(terms: &TermDB) -> Result<Self, ErrorKind> {
        let variables = terms.variables();
        let position = |atom: &AtomIndex| {
            variables
                .binary_search(atom)
                .map_err(|_| ErrorKind::InvalidState)
        };

        let mut blocks: Vec<Block> = Vec::default();
        let mut block_of = vec![usize::MAX; variables.len()];

        for term in terms.iter() {
            let TermKind::Constraint(comparator) = term.kind else {
                continue;
            };

            let (comparator, constant) = match term.coefficients.iter().all(|c| *c == 1.0) {
                true => (comparator, term.constant),
                false => match comparator == Comparator::GreaterThanEqual
                    && term.coefficients.iter().all(|c| *c == -1.0)
                {
                    true => (Comparator::LessThanEqual, -term.constant),
                    false => return Err(ErrorKind::from(ReasonerError::UnsupportedConstraint)),
                },
            };

            let kind = match comparator {
                Comparator::Equal if constant == 1.0 => BlockKind::ExactlyOne,
                Comparator::LessThanEqual if constant == 1.0 => BlockKind::AtMostOne,
                Comparator::Equal | Comparator::LessThanEqual if constant == 0.0 => BlockKind::Zeroed,
                Comparator::LessThanEqual if constant >= term.size() as f32 => continue,
                _ => return Err(ErrorKind::from(ReasonerError::UnsupportedConstraint)),
            };

            for atom in &term.atoms {
                let variable = position(atom)?;
                if block_of[variable] != usize::MAX {
                    return Err(ErrorKind::from(ReasonerError::OverlappingBlocks));
                }
                block_of[variable] = blocks.len();
            }

            blocks.push(Block {
                kind,
                atoms: term.atoms.clone(),
                incident: Vec::default(),
            });
        }

        for (variable, atom) in variables.iter().enumerate() {
            if block_of[variable] == usize::MAX {
                block_of[variable] = blocks.len();
                blocks.push(Block {
                    kind: BlockKind::AtMostOne,
                    atoms: vec![*atom],
                    incident: Vec::default(),
                });
            }
        }

        for (index, term) in terms.iter().enumerate() {
            if term.is_constraint() {
                continue;
            }
            for atom in &term.atoms {
                let block = &mut blocks[block_of[position(atom)?]];
                if block.incident.last() != Some(&index) {
                    block.incident.push(index);
                }
            }
        }

        Ok(Blocks { blocks, block_of })
    }

    /// The block of the atom.
    pub fn block_of(&self, terms: &TermDB, atom: AtomIndex) -> Option<usize> {
        terms
            .variables()
            .binary_search(&atom)
            .ok()
            .map(|position| self.block_of[position])
    }

    /// Sets each block to some random setting.
    pub fn randomise(&self, values: &mut [f32], rng: &mut impl rand::Rng) {
        for block in &self.blocks {
            block.apply(block.random_setting(rng), values);
        }
    }
}

/// Whether the term is weighted and has some loss under the given values.
pub(crate) fn is_unsatisfied(terms: &TermDB, term: usize, values: &[f32]) -> bool {
    let term = &terms.terms()[term];
    !term.is_constraint() && term.loss(values) > numeric::EPSILON
}
