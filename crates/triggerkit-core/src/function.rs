//! Handler orchestration around a normalized event.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::errors::{BoxError, CoreError, FunctionError};
use crate::event::{Event, EventContext};
use crate::normalizer::normalize_event;
use crate::trigger::{TriggerDescriptor, TriggerMetadata};

/// Deferred handler result.
pub type Deferred<T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + Send>>;

type DataConstructor<D> = Box<dyn Fn(&Event) -> Result<D, BoxError> + Send + Sync>;
type Handler<D, T> = Box<dyn Fn(D, EventContext) -> Result<HandlerReturn<T>, BoxError> + Send + Sync>;
type Hook = Box<dyn Fn(&Event) + Send + Sync>;

/// Recognizes errors that mean the payload itself was bad.
pub type DataErrorClassifier = fn(&(dyn Error + 'static)) -> bool;

/// What a handler hands back to the platform.
pub enum HandlerReturn<T> {
    /// A settled value.
    Value(T),
    /// A computation still in flight.
    Deferred(Deferred<T>),
    /// Nothing at all; tolerated with a warning.
    Nothing,
}

impl<T> HandlerReturn<T> {
    /// Wraps a future as a deferred result.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        HandlerReturn::Deferred(Box::pin(future))
    }
}

impl<T> fmt::Debug for HandlerReturn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerReturn::Value(_) => f.write_str("HandlerReturn::Value(..)"),
            HandlerReturn::Deferred(_) => f.write_str("HandlerReturn::Deferred(..)"),
            HandlerReturn::Nothing => f.write_str("HandlerReturn::Nothing"),
        }
    }
}

/// A handler bound to a trigger.
///
/// `D` is what the data constructor builds from the normalized event, `T`
/// is the handler's result.
pub struct CloudFunction<D, T> {
    name: String,
    trigger: TriggerDescriptor,
    data_constructor: DataConstructor<D>,
    handler: Handler<D, T>,
    before: Option<Hook>,
    after: Option<Hook>,
    data_errors: Option<DataErrorClassifier>,
}

impl<D, T> CloudFunction<D, T> {
    /// Binds `handler` to `trigger`, feeding it what `data_constructor` builds.
    pub fn new<C, H>(
        name: impl Into<String>,
        trigger: TriggerDescriptor,
        data_constructor: C,
        handler: H,
    ) -> Self
    where
        C: Fn(&Event) -> Result<D, BoxError> + Send + Sync + 'static,
        H: Fn(D, EventContext) -> Result<HandlerReturn<T>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            trigger,
            data_constructor: Box::new(data_constructor),
            handler: Box::new(handler),
            before: None,
            after: None,
            data_errors: None,
        }
    }

    /// Hook invoked after normalization, before the data constructor.
    pub fn with_before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Hook invoked once the handler settles, on success and failure alike.
    pub fn with_after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    /// Reports handler errors as [`FunctionError::Data`] when `classifier`
    /// accepts the error or any error in its source chain.
    ///
    /// Payloads decoded lazily fail inside the handler, so this is how such
    /// failures stay distinguishable from handler bugs.
    pub fn with_data_errors(mut self, classifier: DataErrorClassifier) -> Self {
        self.data_errors = Some(classifier);
        self
    }

    /// Function name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trigger metadata. Resolves the resource template, so missing
    /// environment surfaces here rather than at definition time.
    pub fn trigger(&self) -> Result<TriggerMetadata, CoreError> {
        self.trigger.metadata()
    }

    /// Descriptor this function listens to.
    pub fn descriptor(&self) -> &TriggerDescriptor {
        &self.trigger
    }

    /// Normalizes `raw` and runs the handler with hooks.
    ///
    /// Returns `Ok(None)` when the handler returned [`HandlerReturn::Nothing`].
    pub async fn call(&self, raw: Value) -> Result<Option<T>, FunctionError> {
        let event = normalize_event(raw, &self.trigger)?;

        if let Some(before) = &self.before {
            before(&event);
        }

        let data = (self.data_constructor)(&event).map_err(FunctionError::DataConstruction)?;
        let outcome = self.settle((self.handler)(data, event.context.clone())).await;

        if let Some(after) = &self.after {
            after(&event);
        }

        outcome.map_err(|err| self.classify(err))
    }

    /// Runs the handler directly, skipping normalization, enrichment and hooks.
    pub async fn run(&self, data: D, context: EventContext) -> Result<Option<T>, FunctionError> {
        self.settle((self.handler)(data, context))
            .await
            .map_err(|err| self.classify(err))
    }

    fn classify(&self, err: BoxError) -> FunctionError {
        let bad_data = self.data_errors.is_some_and(|is_data| {
            let mut current: Option<&(dyn Error + 'static)> = Some(&*err);
            while let Some(cause) = current {
                if is_data(cause) {
                    return true;
                }
                current = cause.source();
            }
            false
        });
        if bad_data {
            FunctionError::Data(err)
        } else {
            FunctionError::Handler(err)
        }
    }

    async fn settle(
        &self,
        returned: Result<HandlerReturn<T>, BoxError>,
    ) -> Result<Option<T>, BoxError> {
        match returned? {
            HandlerReturn::Value(value) => Ok(Some(value)),
            HandlerReturn::Deferred(future) => future.await.map(Some),
            HandlerReturn::Nothing => {
                tracing::warn!(
                    function = %self.name,
                    "function returned nothing, expected a value or a deferred result"
                );
                Ok(None)
            }
        }
    }
}

impl<D, T> fmt::Debug for CloudFunction<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudFunction")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}
