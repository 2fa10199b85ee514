// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Divides rasterize/project/reconstruct work across a scoped thread pool and sums
//! the partial images (§5): "parallelism is expressed by having the orchestrator
//! instantiate N Reconstructors over disjoint view ranges and add their result
//! images... Rasterization and forward projection are likewise parallel over column
//! ranges (rasterize) or view ranges (project)."

use crate::cancel::CancelFlag;
use ct_core::diagnostics::{Diagnostics, ReportLevel};
use ct_core::error::Result;
use ct_image::Image;
use ct_phantom::Phantom;
use ct_projection::{Projection, ViewRecord};
use ct_reconstruct::{ReconstructConfig, Reconstructor};
use ct_scanner::Scanner;

/// Columns handed to a single `rasterize_columns` call before re-checking
/// [`CancelFlag`]; bounds the number of full-size zero-padded images a rasterize
/// worker allocates while still giving cancellation column-level granularity.
const RASTERIZE_CHECK_EVERY: usize = 16;
const PROJECT_CHECK_EVERY: usize = 4;

fn divide(total: usize, workers: usize) -> Vec<(usize, usize)> {
    let workers = workers.max(1).min(total.max(1));
    let chunk = total.div_ceil(workers);
    (0..workers)
        .map(|w| (w * chunk, ((w + 1) * chunk).min(total)))
        .filter(|(start, end)| start < end)
        .collect()
}

/// Rasterizes `phantom` into an `nx`-by-`ny` image, dividing columns across
/// `workers` scoped threads and summing their disjoint partial images.
pub fn rasterize_parallel(
    phantom: &Phantom,
    nx: usize,
    ny: usize,
    view_ratio: f64,
    sample: usize,
    workers: usize,
    trace_level: ReportLevel,
    cancel: &CancelFlag,
) -> Image {
    let ranges = divide(nx, workers);
    let radius = phantom.diameter() * view_ratio / 2.0;
    let x_inc = 2.0 * radius / nx as f64;
    let y_inc = 2.0 * radius / ny as f64;
    let mut image = Image::new_real(nx, ny, x_inc, y_inc);

    std::thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|(col_start, col_end)| {
                scope.spawn(move || {
                    let mut partial = Image::new_real(nx, ny, x_inc, y_inc);
                    let mut col = col_start;
                    while col < col_end {
                        let chunk_end = (col + RASTERIZE_CHECK_EVERY).min(col_end);
                        let mut diag = Diagnostics::new(trace_level);
                        if cancel.is_cancelled() {
                            diag.cancel();
                        }
                        let chunk = phantom.rasterize_columns(
                            nx, ny, view_ratio, sample, col, chunk_end, &mut diag,
                        );
                        partial = partial.add(&chunk).expect("matching dimensions");
                        if diag.is_cancelled() {
                            break;
                        }
                        col = chunk_end;
                    }
                    partial
                })
            })
            .collect();

        for handle in handles {
            let partial = handle.join().expect("rasterize worker panicked");
            image = image.add(&partial).expect("matching dimensions");
        }
    });

    image
}

/// Forward-projects `phantom` through `scanner`, dividing views across `workers`
/// scoped threads. Workers write disjoint view ranges, so the partial projections
/// are merged by copying each worker's populated views rather than summing.
pub fn project_parallel(
    scanner: &Scanner,
    phantom: &Phantom,
    workers: usize,
    trace_level: ReportLevel,
    cancel: &CancelFlag,
) -> Projection {
    let n_view = scanner.config().n_view;
    let ranges = divide(n_view, workers);

    let partials: Vec<(usize, ViewRecord)> = std::thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|(view_start, view_end)| {
                scope.spawn(move || -> Vec<(usize, ViewRecord)> {
                    let mut collected = Vec::with_capacity(view_end - view_start);
                    let mut v = view_start;
                    while v < view_end {
                        let chunk_end = (v + PROJECT_CHECK_EVERY).min(view_end);
                        let mut diag = Diagnostics::new(trace_level);
                        if cancel.is_cancelled() {
                            diag.cancel();
                        }
                        let chunk = scanner.project_views(phantom, v, chunk_end, &mut diag);
                        for view_index in v..chunk_end {
                            collected.push((view_index, chunk.view(view_index).clone()));
                        }
                        if diag.is_cancelled() {
                            break;
                        }
                        v = chunk_end;
                    }
                    collected
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().expect("project worker panicked")).collect()
    });

    // `project_views` derives header fields (detector spacing, view diameter, rotation
    // increment) from the phantom before touching any view; a zero-length probe call
    // gets the same header every worker computed independently, without redoing the
    // ray integration.
    let mut merged = scanner.project_views(phantom, 0, 0, &mut Diagnostics::new(trace_level));

    for (view_index, record) in partials {
        *merged.view_mut(view_index) = record;
    }
    merged
}

/// Reconstructs an image from `projection` under `config`, dividing views across
/// `workers` independent [`Reconstructor`]s and adding their result images (§4.9
/// "the orchestrator ... is responsible for dividing views across workers and
/// summing partial images element-wise, which is correct because backprojection is
/// additive").
pub fn reconstruct_parallel(
    projection: &Projection,
    config: &ReconstructConfig,
    workers: usize,
    cancel: &CancelFlag,
) -> Result<Image> {
    let n_view = projection.n_view();
    let ranges = divide(n_view, workers);

    let images: Vec<Image> = std::thread::scope(|scope| -> Result<Vec<Image>> {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|(view_start, view_end)| {
                let cfg = config.clone();
                scope.spawn(move || -> Result<Image> {
                    let mut recon = Reconstructor::new(projection, cfg)?;
                    for v in view_start..view_end {
                        if cancel.is_cancelled() {
                            recon.diagnostics_mut().cancel();
                            break;
                        }
                        recon.reconstruct_view(v, 1);
                    }
                    recon.post_processing();
                    Ok(recon.image())
                })
            })
            .collect();

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.join().expect("reconstruct worker panicked")?);
        }
        Ok(out)
    })?;

    let mut iter = images.into_iter();
    let mut total = match iter.next() {
        Some(first) => first,
        None => return Ok(Image::new_real(config.nx, config.ny, 1.0, 1.0)),
    };
    for image in iter {
        total = total.add(&image)?;
    }
    Ok(total)
}
