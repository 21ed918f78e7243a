//! Searching enumerated states, on the calling thread or on a worker pool.

use crossbeam::channel::unbounded;
use gsv_core::InformationState;
use gsv_eval::log::targets;
use gsv_eval::normalize;
use gsv_types::EvalResult;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::relations::Context;

/// The index of the first state, in enumeration order, on which `probe`
/// holds. The first failure in enumeration order is returned instead if it
/// comes before any hit.
///
/// With more than one thread the states are split into contiguous chunks,
/// one worker per chunk. Workers evaluate with the null logger and stop once
/// a hit earlier than anything left in their chunk has been found, so the
/// outcome is the same as on a single thread.
pub(crate) fn find_first<P>(
    context: &Context<'_>,
    states: &[InformationState],
    threads: usize,
    probe: &P,
) -> EvalResult<Option<usize>>
where
    P: Fn(&Context<'_>, &InformationState) -> EvalResult<bool> + Sync,
{
    if threads <= 1 || states.len() < 2 {
        for (index, state) in states.iter().enumerate() {
            if probe(context, state)? {
                return Ok(Some(index));
            }
        }
        return Ok(None);
    }

    let chunk_size = states.len().div_ceil(threads);
    let earliest = AtomicUsize::new(usize::MAX);
    let (tx, rx) = unbounded::<(usize, EvalResult<()>)>();
    let model = context.model();
    let limits = context.limits();

    let scoped = crossbeam::scope(|scope| {
        for (chunk, slice) in states.chunks(chunk_size).enumerate() {
            let tx = tx.clone();
            let earliest = &earliest;
            let limits = limits.clone();
            scope.spawn(move |_| {
                let worker = Context::new(model, limits, normalize(None));
                let offset = chunk * chunk_size;
                for (i, state) in slice.iter().enumerate() {
                    let index = offset + i;
                    if index > earliest.load(Ordering::Relaxed) {
                        return;
                    }
                    let outcome = match probe(&worker, state) {
                        Ok(false) => continue,
                        Ok(true) => Ok(()),
                        Err(e) => Err(e),
                    };
                    earliest.fetch_min(index, Ordering::Relaxed);
                    let _ = tx.send((index, outcome));
                    return;
                }
            });
        }
    });
    drop(tx);

    if let Err(panic) = scoped {
        std::panic::resume_unwind(panic);
    }

    let first = rx.try_iter().min_by_key(|(index, _)| *index);
    log::trace!(target: targets::ENUMERATION, "Workers checked {} states, first hit {:?}", states.len(), first.as_ref().map(|(index, _)| index));
    match first {
        None => Ok(None),
        Some((index, Ok(()))) => Ok(Some(index)),
        Some((_, Err(e))) => Err(e),
    }
}
