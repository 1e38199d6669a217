//! Shape registry
//!
//! The type metadata cache: one plan per Rust type for the registry's lifetime.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CodecError, Result};

use super::{Record, RecordPlan, ShapePlan, Shaped};

/// Memoized shape plans and record field tables
///
/// ## Concurrency:
/// - Lookups take the read lock only
/// - A miss takes the write lock, re-checks, then derives and inserts, so
///   concurrent callers for the same type converge on one shared `Arc`
/// - Derivation never re-enters the registry, so holding the write lock is safe
pub struct ShapeRegistry {
    /// Shape plans by type
    plans: RwLock<HashMap<TypeId, Arc<ShapePlan>>>,

    /// `Arc<RecordPlan<T>>` by `TypeId::of::<T>()`
    records: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,

    /// Number of plans and field tables derived since creation
    derivations: AtomicUsize,
}

impl ShapeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            derivations: AtomicUsize::new(0),
        }
    }

    /// Get the plan for `T`, deriving it on first use
    pub fn plan<T: Shaped>(&self) -> Arc<ShapePlan> {
        let id = TypeId::of::<T>();
        if let Some(plan) = self.plans.read().get(&id) {
            return Arc::clone(plan);
        }

        let mut plans = self.plans.write();
        let plan = plans.entry(id).or_insert_with(|| {
            self.derivations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Derived shape plan for {}", type_name::<T>());
            Arc::new(T::describe())
        });
        Arc::clone(plan)
    }

    /// Get the field table for record `T`, deriving it on first use
    pub fn record_plan<T: Record>(&self) -> Result<Arc<RecordPlan<T>>> {
        let id = TypeId::of::<T>();
        let cached = self.records.read().get(&id).cloned();

        let entry = match cached {
            Some(entry) => entry,
            None => {
                let mut records = self.records.write();
                let entry = records.entry(id).or_insert_with(|| {
                    self.derivations.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Derived field table for record {}", T::TYPE_NAME);
                    let plan: Arc<dyn Any + Send + Sync> = Arc::new(RecordPlan::<T>::derive());
                    plan
                });
                Arc::clone(entry)
            }
        };

        entry.downcast::<RecordPlan<T>>().map_err(|_| {
            CodecError::unsupported(format!(
                "Cached field table for {} has an unexpected type",
                T::TYPE_NAME
            ))
        })
    }

    /// Number of cached plans and field tables
    pub fn len(&self) -> usize {
        self.plans.read().len() + self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of derivations performed since creation
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }

    /// Drop every cached plan
    pub fn clear(&self) {
        self.plans.write().clear();
        self.records.write().clear();
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
