use std::{
    ops::Deref as _,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use image::{GenericImage, GenericImageView, RgbaImage};

use crate::{
    camera::Camera,
    geometry::{ScreenBlock, ScreenPoint},
    renderer::{RenderSettings, worker::Worker},
    scene::Scene,
    screen_block::ScreenBlockExt as _,
};

/// Starts rendering on one worker thread per core and returns immediately;
/// the returned handle exposes progress, the shared image, and abort.
pub fn render<F1, F2>(
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    started_tile_callback: F1,
    finished_tile_callback: F2,
) -> anyhow::Result<RenderProgress>
where
    F1: Fn(ScreenBlock) + Send + Sync + 'static,
    F2: Fn(ScreenBlock) + Send + Sync + 'static,
{
    let resolution = camera.resolution();
    let image = RgbaImage::new(resolution.x, resolution.y);
    let state = Arc::new(RenderState {
        scene,
        camera,
        settings,

        image: Mutex::new(image),

        tile_ordering: ScreenBlock::with_size(ScreenPoint::origin(), &resolution)
            .tile_ordering(settings.tile_size),
        next_tile_index: AtomicUsize::new(0),
    });
    let started_tile_callback = Arc::new(started_tile_callback);
    let finished_tile_callback = Arc::new(finished_tile_callback);

    let workers: Vec<Option<core_affinity::CoreId>> = match core_affinity::get_core_ids() {
        Some(cores) if !cores.is_empty() => cores.into_iter().map(Some).collect(),
        _ => vec![None; num_cpus::get()],
    };

    let threads = workers
        .into_iter()
        .enumerate()
        .map(|(worker_id, core)| {
            let state = Arc::clone(&state);
            let started_tile_callback = Arc::clone(&started_tile_callback);
            let finished_tile_callback = Arc::clone(&finished_tile_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let tile_size = settings.tile_size.get();
                    let mut buffer = RgbaImage::new(tile_size, tile_size);

                    while let Some((tile_index, tile)) = state.next_tile() {
                        (started_tile_callback)(tile.clone());

                        Worker::render_tile(
                            &state.scene,
                            &state.camera,
                            &state.settings,
                            tile_index,
                            tile,
                            &mut buffer,
                        );
                        state
                            .image
                            .lock()
                            .expect("Poisoned lock!")
                            .copy_from(
                                buffer.view(0, 0, tile.width(), tile.height()).deref(),
                                tile.min.x,
                                tile.min.y,
                            )
                            .unwrap_or_else(|_| {
                                unreachable!("The buffer should always fit into the output")
                            });

                        (finished_tile_callback)(tile.clone());
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderProgress {
        render_state: state,
        threads,
    })
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<JoinHandle<()>>,
}

impl RenderProgress {
    /// Return number of processed and total tiles.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.render_state.tile_ordering.len();
        let processed = self
            .render_state
            .next_tile_index
            .load(Ordering::Acquire)
            .min(total);
        (processed, total)
    }

    pub fn progress_percent(&self) -> f32 {
        let (processed, total) = self.progress();
        100.0 * (processed as f32) / (total as f32)
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their tiles, but no new ones
    /// will be started.
    pub fn abort(&self) {
        self.render_state
            .next_tile_index
            .store(self.render_state.tile_ordering.len(), Ordering::Release);
    }

    /// Wait for the workers to finish.
    pub fn wait(&mut self) {
        self.threads
            .drain(..)
            .for_each(|handle| handle.join().unwrap());
    }

    pub fn image(&self) -> &Mutex<RgbaImage> {
        &self.render_state.image
    }
}

struct RenderState {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,

    image: Mutex<RgbaImage>,

    tile_ordering: Vec<ScreenBlock>,
    next_tile_index: AtomicUsize,
}

impl RenderState {
    fn next_tile(&self) -> Option<(usize, &ScreenBlock)> {
        let id = self.next_tile_index.fetch_add(1, Ordering::AcqRel);
        self.tile_ordering.get(id).map(|tile| (id, tile))
    }
}
