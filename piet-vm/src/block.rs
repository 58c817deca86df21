use std::collections::HashSet;
use std::collections::VecDeque;

use isa::color::Color;
use isa::color::ColorClassifier;
use isa::orientation::CodelChooser;
use isa::orientation::Direction;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::image::PixelSource;
use crate::pointer::Codel;
use crate::program::Program;
use crate::program::ProgramId;

/// A maximal, 4-connected region of codels sharing the same [`Color`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub color: Color,

    /// All codels of the block, in the order they were discovered. Never
    /// empty.
    pub codels: Vec<Codel>,
}

/// Geometric analysis of the blocks of a program.
pub trait BlockAnalyzer {
    /// The number of codels in the block containing `origin`. At least 1.
    fn block_size<S, K>(&mut self, program: &Program<S, K>, origin: Codel) -> usize
    where
        S: PixelSource,
        K: ColorClassifier;

    /// The codel the instruction pointer would move to when leaving the block
    /// containing `origin` with the given orientation. The returned codel
    /// might lie outside the image.
    fn candidate_exit<S, K>(
        &mut self,
        program: &Program<S, K>,
        origin: Codel,
        dp: Direction,
        cc: CodelChooser,
    ) -> Codel
    where
        S: PixelSource,
        K: ColorClassifier;
}

/// Finds blocks by flood fill. The most recently analyzed block is remembered,
/// so repeated questions about the same block only flood it once. The cache
/// is keyed by the [program's id](Program::id) and the origin.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct FloodFill {
    cache: Option<(ProgramId, Codel, Block)>,
}

impl Block {
    /// The block containing `origin`. If `origin` lies outside the image, the
    /// block consists of `origin` alone and is considered black.
    pub fn containing<S, K>(program: &Program<S, K>, origin: Codel) -> Self
    where
        S: PixelSource,
        K: ColorClassifier,
    {
        let Some(color) = program.color_at(origin) else {
            let codels = vec![origin];
            return Self { color: Color::Black, codels };
        };

        let mut codels = vec![];
        let mut seen = HashSet::from([origin]);
        let mut queue = VecDeque::from([origin]);
        while let Some(codel) = queue.pop_front() {
            codels.push(codel);
            for direction in Direction::iter() {
                let neighbor = codel.step(direction);
                if program.color_at(neighbor) == Some(color) && seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        Self { color, codels }
    }

    pub fn size(&self) -> usize {
        self.codels.len()
    }

    pub fn contains(&self, codel: Codel) -> bool {
        self.codels.contains(&codel)
    }

    /// The codel through which the instruction pointer leaves the block.
    ///
    /// Of all codels on the block's furthest edge in direction `dp`, this is
    /// the one furthest in the direction `cc` points to, relative to `dp`.
    pub fn exit_codel(&self, dp: Direction, cc: CodelChooser) -> Codel {
        let chooser_direction = cc.absolute(dp);
        let furthest_edge = self
            .codels
            .iter()
            .copied()
            .max_set_by_key(|codel| codel.extent_in(dp));

        furthest_edge
            .into_iter()
            .max_by_key(|codel| codel.extent_in(chooser_direction))
            .unwrap_or_default()
    }
}

impl FloodFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// The block containing `origin`, served from the cache if possible.
    pub fn block_at<S, K>(&mut self, program: &Program<S, K>, origin: Codel) -> &Block
    where
        S: PixelSource,
        K: ColorClassifier,
    {
        let key = (program.id(), origin);
        let is_cached = self
            .cache
            .as_ref()
            .is_some_and(|(id, cached_origin, _)| (*id, *cached_origin) == key);
        if !is_cached {
            self.cache = None;
        }

        let (_, _, block) = self
            .cache
            .get_or_insert_with(|| (key.0, origin, Block::containing(program, origin)));
        block
    }

    pub fn forget(&mut self) {
        self.cache = None;
    }
}

impl BlockAnalyzer for FloodFill {
    fn block_size<S, K>(&mut self, program: &Program<S, K>, origin: Codel) -> usize
    where
        S: PixelSource,
        K: ColorClassifier,
    {
        self.block_at(program, origin).size()
    }

    fn candidate_exit<S, K>(
        &mut self,
        program: &Program<S, K>,
        origin: Codel,
        dp: Direction,
        cc: CodelChooser,
    ) -> Codel
    where
        S: PixelSource,
        K: ColorClassifier,
    {
        self.block_at(program, origin).exit_codel(dp, cc).step(dp)
    }
}
