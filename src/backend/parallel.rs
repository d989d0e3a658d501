use rayon::prelude::*;

use crate::{
    backend::KernelBackend,
    foundation::core::Planes,
    foundation::error::{VidpressError, VidpressResult},
    raster::{
        channel::Channel,
        frame::{ColorSpace, Frame, Image},
    },
    stages::{
        color, dct,
        motion::{self, Candidate, MotionSearch, MotionVector},
    },
};

// Samples per color-conversion work item.
const COLOR_CHUNK: usize = 4096;

/// Kernels spread over a dedicated rayon pool.
///
/// Motion search runs blocks in parallel and, inside a block, candidate rows in parallel. Row
/// winners are collected in row order and folded with a keep-first minimum, so the chosen vector
/// is the same one the sequential scan picks.
pub struct ParallelBackend {
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for ParallelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelBackend")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl ParallelBackend {
    /// `None` uses rayon's default thread count.
    pub fn new(threads: Option<usize>) -> VidpressResult<Self> {
        Ok(Self {
            pool: build_thread_pool(threads)?,
        })
    }
}

impl KernelBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn convert_to_ycbcr(&self, image: &mut Image) -> VidpressResult<()> {
        color::ensure_rgb(image)?;
        let Planes { y, cb, cr } = image.planes_mut();
        self.pool.install(|| {
            y.data_mut()
                .par_chunks_mut(COLOR_CHUNK)
                .zip(cb.data_mut().par_chunks_mut(COLOR_CHUNK))
                .zip(cr.data_mut().par_chunks_mut(COLOR_CHUNK))
                .for_each(|((r, g), b)| color::convert_in_place(r, g, b));
        });
        image.set_color(ColorSpace::YCbCr);
        Ok(())
    }

    fn estimate_motion(
        &self,
        reference: &Frame,
        target: &Frame,
        search: &MotionSearch,
    ) -> VidpressResult<Vec<MotionVector>> {
        motion::check_pair(reference, target)?;
        let grid = search.grid(target.dims());
        let vectors = self.pool.install(|| {
            grid.origins()
                .par_iter()
                .map(|&(mx, my)| {
                    let rows: Vec<Candidate> = motion::window(my, search.window_size)
                        .into_par_iter()
                        .map(|sy| motion::search_row(reference, target, mx, my, sy, search))
                        .collect();
                    rows.into_iter()
                        .fold(Candidate::NONE, Candidate::keep_first_min)
                        .vector
                })
                .collect::<Vec<_>>()
        });
        Ok(vectors)
    }

    fn forward_dct(&self, src: &Channel) -> VidpressResult<Channel> {
        src.ensure_block_aligned("dct")?;
        let width = src.width();
        let band = 8 * width;
        let mut out = Channel::zeroed(width, src.height())?;
        self.pool.install(|| {
            src.data()
                .par_chunks_exact(band)
                .zip(out.data_mut().par_chunks_exact_mut(band))
                .for_each(|(s, d)| dct::dct_band(s, d, width));
        });
        Ok(out)
    }
}

fn build_thread_pool(threads: Option<usize>) -> VidpressResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VidpressError::validation(
            "parallel backend 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        VidpressError::backend("parallel", format!("failed to build rayon thread pool: {e}"))
    })
}
