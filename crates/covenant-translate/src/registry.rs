//! The translator registry.
//!
//! Two concurrent maps, one per direction, keyed by [`TypeDescriptor`]. The
//! registry starts out with the built-in translators and grows in two ways:
//!
//! - explicit [`register`](TranslatorRegistry::register), which refuses to
//!   shadow an existing entry
//! - lazy generation of an [`EnumTranslator`] the first time an enumeration
//!   descriptor is looked up
//!
//! Both maps always hold the same descriptors. An enumeration is generated
//! once for both directions, whichever direction is looked up first, while
//! the outbound entry is held; registration takes the same entry first, so
//! racing lookups and registrations all observe one translator.
//!
//! Opaque descriptors resolve to the shared [`DisplayTranslator`]. Any other
//! miss returns `None`; callers decide whether that is fatal.
//!
//! # Example
//!
//! ```
//! use covenant_core::{names, Native, TypeDescriptor};
//! use covenant_translate::TranslatorRegistry;
//!
//! let registry = TranslatorRegistry::new();
//! let ints = registry.translator(&TypeDescriptor::scalar(names::I64)).unwrap();
//! assert_eq!(ints.from_wire("42").unwrap(), Native::I64(42));
//!
//! assert!(registry.lookup_to_wire(&TypeDescriptor::scalar("Unknown")).is_none());
//! ```

use crate::binary::{BitSetTranslator, BytesTranslator, UuidTranslator};
use crate::display::DisplayTranslator;
use crate::document::DocumentTranslator;
use crate::enumeration::EnumTranslator;
use crate::numeric::{DecimalTranslator, FloatTranslator, IntegerTranslator};
use crate::temporal::{DateTimeTranslator, DateTranslator, OffsetDateTimeTranslator};
use crate::text::{BoolTranslator, TextTranslator};
use crate::translator::{FromWire, ToWire, Translator};
use covenant_core::{names, ContractError, ContractResult, TypeDescriptor};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Shared registry of translators keyed by descriptor.
pub struct TranslatorRegistry {
    to_wire: DashMap<TypeDescriptor, Arc<dyn ToWire>>,
    from_wire: DashMap<TypeDescriptor, Arc<dyn FromWire>>,
    catch_all: Arc<DisplayTranslator>,
}

impl TranslatorRegistry {
    /// Creates a registry holding the built-in translators.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.install(names::I32, Translator::of(IntegerTranslator::<i32>::strict()));
        registry.install(names::I64, Translator::of(IntegerTranslator::<i64>::strict()));
        registry.install(names::F32, Translator::of(FloatTranslator::<f32>::strict()));
        registry.install(names::F64, Translator::of(FloatTranslator::<f64>::strict()));
        registry.install(names::DECIMAL, Translator::of(DecimalTranslator::strict()));
        registry.install(names::BOOL, Translator::of(BoolTranslator::strict()));
        registry.install(names::STRING, Translator::of(TextTranslator));
        registry.install(names::BYTES, Translator::of(BytesTranslator));
        registry.install(names::UUID, Translator::of(UuidTranslator));
        registry.install(names::BITSET, Translator::of(BitSetTranslator));
        registry.install(names::DATE, Translator::of(DateTranslator));
        registry.install(names::DATETIME, Translator::of(DateTimeTranslator));
        registry.install(names::OFFSET_DATETIME, Translator::of(OffsetDateTimeTranslator));

        let document = Translator::of(DocumentTranslator::default());
        let untyped = TypeDescriptor::document(names::JSON);
        registry.to_wire.insert(untyped.clone(), document.outbound().clone());
        registry.from_wire.insert(untyped, document.inbound().clone());
        registry
    }

    /// Creates a registry with no translators at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            to_wire: DashMap::new(),
            from_wire: DashMap::new(),
            catch_all: Arc::new(DisplayTranslator),
        }
    }

    /// The process-wide registry, created with the built-ins on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<TranslatorRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Self::new())).clone()
    }

    fn install(&self, name: &str, translator: Translator) {
        let descriptor = TypeDescriptor::scalar(name);
        self.to_wire.insert(descriptor.clone(), translator.outbound().clone());
        self.from_wire.insert(descriptor, translator.inbound().clone());
    }

    /// Registers both directions for a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::DuplicateTranslator`] if the descriptor is
    /// already present. Nothing is changed in that case.
    pub fn register(
        &self,
        descriptor: TypeDescriptor,
        to_wire: Arc<dyn ToWire>,
        from_wire: Arc<dyn FromWire>,
    ) -> ContractResult<()> {
        match self.to_wire.entry(descriptor.clone()) {
            Entry::Occupied(_) => Err(ContractError::DuplicateTranslator {
                descriptor: descriptor.to_string(),
            }),
            Entry::Vacant(slot) => {
                debug!(descriptor = %descriptor, "Registering translator");
                self.from_wire.insert(descriptor, from_wire);
                slot.insert(to_wire);
                Ok(())
            }
        }
    }

    /// Registers a translator pair.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn register_translator(
        &self,
        descriptor: TypeDescriptor,
        translator: Translator,
    ) -> ContractResult<()> {
        self.register(
            descriptor,
            translator.outbound().clone(),
            translator.inbound().clone(),
        )
    }

    /// Looks up the outbound translator for a descriptor.
    #[must_use]
    pub fn lookup_to_wire(&self, descriptor: &TypeDescriptor) -> Option<Arc<dyn ToWire>> {
        if let Some(found) = self.to_wire.get(descriptor) {
            return Some(found.value().clone());
        }
        if descriptor.is_opaque() {
            return Some(self.catch_all.clone());
        }
        self.generate_enumeration(descriptor)?;
        self.to_wire.get(descriptor).map(|found| found.value().clone())
    }

    /// Looks up the inbound translator for a descriptor.
    #[must_use]
    pub fn lookup_from_wire(&self, descriptor: &TypeDescriptor) -> Option<Arc<dyn FromWire>> {
        if let Some(found) = self.from_wire.get(descriptor) {
            return Some(found.value().clone());
        }
        if descriptor.is_opaque() {
            return Some(self.catch_all.clone());
        }
        self.generate_enumeration(descriptor)?;
        self.from_wire.get(descriptor).map(|found| found.value().clone())
    }

    /// Installs one [`EnumTranslator`] in both maps unless the descriptor
    /// already has an entry. `None` for non-enumeration descriptors.
    fn generate_enumeration(&self, descriptor: &TypeDescriptor) -> Option<()> {
        let variants = descriptor.variants()?;
        if let Entry::Vacant(slot) = self.to_wire.entry(descriptor.clone()) {
            debug!(descriptor = %descriptor, "Generated enumeration translator");
            let generated = Arc::new(EnumTranslator::new(descriptor.name(), variants));
            self.from_wire.insert(descriptor.clone(), generated.clone());
            slot.insert(generated);
        }
        Some(())
    }

    /// Looks up both directions.
    #[must_use]
    pub fn translator(&self, descriptor: &TypeDescriptor) -> Option<Translator> {
        Some(Translator::new(
            self.lookup_to_wire(descriptor)?,
            self.lookup_from_wire(descriptor)?,
        ))
    }

    /// Returns `true` if the descriptor has a registered, built-in or
    /// generated translator pair. The catch-all does not count.
    #[must_use]
    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.to_wire.contains_key(descriptor)
    }

    /// Number of descriptors with a translator pair.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_wire.len()
    }

    /// Returns `true` if no descriptor has a translator pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_wire.is_empty()
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("descriptors", &self.to_wire.len())
            .finish()
    }
}
