use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{error, trace};

use crate::events::contexts::{CallContext, ContextKind};
use crate::events::phase::PhaseMask;
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};

pub trait CallProcessor {
    /// Called for every context the processor is bound to. Processors may dispatch narrower
    /// contexts through `registry`.
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult;
}

impl<F> CallProcessor for F
where
    F: FnMut(&CallProcessorRegistry, &mut CallContext<'_>) -> ProcessingResult,
{
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        self(registry, context)
    }
}

pub type SharedProcessor = Rc<RefCell<dyn CallProcessor>>;

/// Wraps a closure so it can be registered. Going through this function keeps the closure's
/// argument lifetimes generic.
pub fn processor_fn<F>(processor: F) -> SharedProcessor
where
    F: FnMut(&CallProcessorRegistry, &mut CallContext<'_>) -> ProcessingResult + 'static,
{
    Rc::new(RefCell::new(processor))
}

/// A processor that knows the contexts it handles.
pub trait CallProcessorBinder: CallProcessor + Sized + 'static {
    fn bindings() -> Vec<(ContextKind, PhaseMask)>;

    fn bind(self, registry: &CallProcessorRegistry) -> ScopedRegistration {
        registry.register_all(&Self::bindings(), Rc::new(RefCell::new(self)))
    }
}

#[derive(Clone)]
struct Binding {
    id: u64,
    kind: ContextKind,
    phases: PhaseMask,
    processor: SharedProcessor,
}

#[derive(Default)]
struct RegistryInner {
    bindings: RefCell<Vec<Binding>>,
    next_id: Cell<u64>,
}

/// Routes contexts to the processors bound to their kind and phase, in registration order.
#[derive(Clone, Default)]
pub struct CallProcessorRegistry {
    inner: Rc<RegistryInner>,
}

/// Unbinds its processor when dropped.
#[must_use = "the processor is unbound as soon as the registration is dropped"]
pub struct ScopedRegistration {
    registry: Weak<RegistryInner>,
    ids: Vec<u64>,
}

impl Drop for ScopedRegistration {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner
                .bindings
                .borrow_mut()
                .retain(|binding| !self.ids.contains(&binding.id));
        }
    }
}

impl CallProcessorRegistry {
    pub fn new() -> CallProcessorRegistry {
        CallProcessorRegistry::default()
    }

    pub fn register(&self, kind: ContextKind, phases: PhaseMask, processor: SharedProcessor) -> ScopedRegistration {
        self.register_all(&[(kind, phases)], processor)
    }

    /// Binds one processor to several context kinds, unbinding all of them together.
    pub fn register_all(&self, bindings: &[(ContextKind, PhaseMask)], processor: SharedProcessor) -> ScopedRegistration {
        let mut ids = Vec::with_capacity(bindings.len());
        let mut storage = self.inner.bindings.borrow_mut();
        for (kind, phases) in bindings {
            let id = self.inner.next_id.get();
            self.inner.next_id.set(id + 1);
            storage.push(Binding {
                id,
                kind: *kind,
                phases: *phases,
                processor: processor.clone(),
            });
            ids.push(id);
        }

        ScopedRegistration {
            registry: Rc::downgrade(&self.inner),
            ids,
        }
    }

    pub fn binding_count(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    pub fn process(&self, context: &mut CallContext<'_>) -> ProcessingResult {
        let kind = context.kind();
        let phase = context.phase();

        // Snapshot, so processors can register and dispatch while we iterate.
        let bindings = self
            .inner
            .bindings
            .borrow()
            .iter()
            .filter(|binding| binding.kind == kind && phase.is_none_or(|phase| binding.phases.matches(phase)))
            .cloned()
            .collect::<Vec<_>>();

        trace!("Dispatching {:?} ({:?}) to {} processors", kind, phase, bindings.len());

        let mut combiner = ProcessingResultCombiner::new();
        for binding in bindings {
            match binding.processor.try_borrow_mut() {
                Ok(mut processor) => combiner += processor.process(self, context),
                Err(_) => {
                    error!("Processor bound to {:?} is already running and can't be re-entered", kind);
                    combiner += ProcessingResult::Failure;
                }
            }
        }
        combiner.result()
    }
}
