use super::backward_op::{BackwardOp, ClosureBackward};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// One recorded operation invocation.
#[derive(Debug)]
pub struct TraceEntry {
    name: &'static str,
    op: Box<dyn BackwardOp>,
}

impl TraceEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn inputs(&self) -> Vec<NodeId> {
        self.op.inputs()
    }

    pub fn outputs(&self) -> Vec<NodeId> {
        self.op.outputs()
    }
}

/// Differentiation session: the execution context of one forward evaluation.
///
/// Operations compute their outputs eagerly and append one backward entry to the
/// trace. [`finalize`](Session::finalize) replays the trace from the last entry to
/// the first, which on a DAG is a valid reverse topological order, so no separate
/// sort is needed.
///
/// A session is single-threaded: use one session per independent forward pass and
/// never share a destination tensor between sessions running concurrently.
#[derive(Debug, Default)]
pub struct Session {
    trace: Vec<TraceEntry>,
    training: bool,
    finalized: bool,
}

impl Session {
    /// Creates an inference session (dropout disabled).
    pub fn new() -> Self {
        Session::default()
    }

    /// Creates a training session (dropout active).
    pub fn training() -> Self {
        Session {
            training: true,
            ..Session::default()
        }
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    /// The recorded entries in registration order.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Fails with `SessionFinalized` once the trace has been replayed.
    pub(crate) fn ensure_recording(&self, operation: &str) -> Result<(), ArchGradError> {
        if self.finalized {
            return Err(ArchGradError::SessionFinalized {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Appends a backward entry. Forward code has already validated its inputs.
    pub(crate) fn push<B>(&mut self, name: &'static str, op: B)
    where
        B: BackwardOp + 'static,
    {
        log::trace!("session: recorded #{} {}", self.trace.len(), name);
        self.trace.push(TraceEntry {
            name,
            op: Box::new(op),
        });
    }

    /// Registers a custom backward closure.
    ///
    /// When replayed, `backward(inputs, outputs)` must add its contribution into the
    /// gradients of `inputs` (see [`Tensor::accumulate_grad`]) from the gradients of
    /// `outputs`.
    pub fn record<F>(
        &mut self,
        name: &'static str,
        inputs: &[Tensor],
        outputs: &[Tensor],
        backward: F,
    ) -> Result<(), ArchGradError>
    where
        F: Fn(&[Tensor], &[Tensor]) -> Result<(), ArchGradError> + Send + Sync + 'static,
    {
        self.ensure_recording(name)?;
        self.push(
            name,
            ClosureBackward {
                inputs: inputs.to_vec(),
                outputs: outputs.to_vec(),
                backward: Box::new(backward),
            },
        );
        Ok(())
    }

    /// Replays every entry exactly once, last-registered first.
    ///
    /// After this returns, every tensor reachable through the trace holds the sum of
    /// the gradients contributed by all of its consumers. The session then refuses
    /// further operations until [`reset`](Session::reset).
    pub fn finalize(&mut self) -> Result<(), ArchGradError> {
        self.ensure_recording("finalize")?;
        self.finalized = true;
        let trace = std::mem::take(&mut self.trace);
        log::debug!("session: replaying {} trace entries", trace.len());
        for entry in trace.iter().rev() {
            entry.op.backward().map_err(|e| {
                log::warn!("session: backward of {} failed: {}", entry.name, e);
                e
            })?;
        }
        Ok(())
    }

    /// Clears the trace and makes the session usable for a new forward pass.
    pub fn reset(&mut self) {
        self.trace.clear();
        self.finalized = false;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
