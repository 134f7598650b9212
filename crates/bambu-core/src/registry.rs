//! Dynamic entity registry for AMS slots and filament trays.
//!
//! Entities live in slotmap arenas and are addressed through a lookup index
//! from their stable composite key. Entities are registered once, during the
//! construction pass over the full snapshot; afterwards the merge engine only
//! looks them up and mutates them. Lookups by a key that was never registered
//! return `None` and change nothing.

use crate::device::{HumidityLevel, filament_name};
use crate::id::{SlotId, SlotKey, TrayId, TrayKey};
use crate::snapshot::{AmsUnitReport, PrintReport, VirtualTrayReport};
use slotmap::{Key, SlotMap};
use std::collections::HashMap;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// Entity payloads
// ---------------------------------------------------------------------------

/// Slot-level sensor readings (an AMS unit, or the virtual tray's header).
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub key: SlotKey,
    /// Last temperature, in ºC. `None` until first reported.
    pub temperature: Option<f64>,
    pub humidity: Option<HumidityLevel>,
    /// The virtual tray header carries no humidity sensor.
    pub has_humidity: bool,
    /// Trays of this slot in declared order.
    pub trays: Vec<TrayId>,
}

/// What a tray currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filament {
    /// Registered but never reported.
    Pending,
    /// The tray reported no filament index.
    Empty,
    /// Index resolved through the filament catalog.
    Known(&'static str),
    /// Index not present in the catalog.
    Unknown(String),
}

impl Filament {
    /// Resolve a reported `tray_info_idx`. No index means an empty tray.
    pub fn from_index(tray_info_idx: Option<&str>) -> Self {
        match tray_info_idx {
            None => Filament::Empty,
            Some(idx) => match filament_name(idx) {
                Some(name) => Filament::Known(name),
                None => Filament::Unknown(idx.to_string()),
            },
        }
    }

    /// Display label for the filament type.
    pub fn label(&self) -> &str {
        match self {
            Filament::Pending => "---",
            Filament::Empty => "Empty",
            Filament::Known(name) => name,
            Filament::Unknown(_) => "Unknown",
        }
    }
}

/// Filament descriptor of one tray.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayView {
    pub key: TrayKey,
    pub slot: SlotId,
    pub filament: Filament,
    /// Last reported `RRGGBBAA` color. An empty tray keeps its last color.
    pub color: Option<String>,
}

impl TrayView {
    /// CSS-style color, e.g. `#FF6A13FF`.
    pub fn color_hex(&self) -> Option<String> {
        self.color.as_ref().map(|c| format!("#{c}"))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Keyed arena: entities addressed by a handle, found through a key index.
#[derive(Debug, Clone)]
pub struct Registry<I: Key, K, V> {
    entries: SlotMap<I, V>,
    index: HashMap<K, I>,
    order: Vec<I>,
}

impl<I: Key, K, V> Default for Registry<I, K, V> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
            index: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<I, K, V> Registry<I, K, V>
where
    I: Key,
    K: Eq + Hash,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, or replace the entity already registered under
    /// `key`. A replaced entity keeps its handle.
    pub fn register(&mut self, key: K, entity: V) -> I {
        if let Some(&id) = self.index.get(&key) {
            self.entries[id] = entity;
            return id;
        }
        let id = self.entries.insert(entity);
        self.index.insert(key, id);
        self.order.push(id);
        id
    }

    /// Entity registered under `key`, if any.
    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.index.get(key).and_then(|&id| self.entries.get(id))
    }

    /// Mutable access to the entity registered under `key`, if any.
    pub fn lookup_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        self.entries.get_mut(id)
    }

    /// Handle assigned to `key` at registration.
    pub fn id_of(&self, key: &K) -> Option<I> {
        self.index.get(key).copied()
    }

    /// Entity behind a handle.
    pub fn get(&self, id: I) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut V> {
        self.entries.get_mut(id)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &V)> {
        self.order
            .iter()
            .filter_map(|&id| self.entries.get(id).map(|v| (id, v)))
    }
}

// ---------------------------------------------------------------------------
// EntityRegistry
// ---------------------------------------------------------------------------

/// The two independent registries: slot-level sensors and trays.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    pub slots: Registry<SlotId, SlotKey, SlotView>,
    pub trays: Registry<TrayId, TrayKey, TrayView>,
}

impl EntityRegistry {
    /// Create a registry with no slots and no trays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every slot and tray declared by a full report. Returns the
    /// number of entities registered.
    ///
    /// An AMS block listing units wins; otherwise the virtual tray becomes a
    /// single synthetic slot with a single tray, both keyed `Tray#<id>`.
    pub fn discover(&mut self, report: &PrintReport) -> usize {
        if let Some(units) = report.ams_units() {
            return units.iter().map(|unit| self.register_unit(unit)).sum();
        }
        match &report.vt_tray {
            Some(tray) => self.register_virtual(tray),
            None => 0,
        }
    }

    fn register_unit(&mut self, unit: &AmsUnitReport) -> usize {
        let slot = self.slots.register(
            SlotKey::ams(&unit.id),
            SlotView {
                key: SlotKey::ams(&unit.id),
                temperature: None,
                humidity: None,
                has_humidity: true,
                trays: Vec::with_capacity(unit.trays.len()),
            },
        );
        let mut trays: Vec<TrayId> = Vec::with_capacity(unit.trays.len());
        for tray in &unit.trays {
            let key = TrayKey::ams(&unit.id, &tray.id);
            let id = self.trays.register(
                key.clone(),
                TrayView {
                    key,
                    slot,
                    filament: Filament::Pending,
                    color: None,
                },
            );
            // a tray id listed twice names the same tray
            if !trays.contains(&id) {
                trays.push(id);
            }
        }
        let count = 1 + trays.len();
        if let Some(view) = self.slots.get_mut(slot) {
            view.trays = trays;
        }
        count
    }

    fn register_virtual(&mut self, tray: &VirtualTrayReport) -> usize {
        let slot = self.slots.register(
            SlotKey::virtual_tray(&tray.id),
            SlotView {
                key: SlotKey::virtual_tray(&tray.id),
                temperature: None,
                humidity: None,
                has_humidity: false,
                trays: Vec::new(),
            },
        );
        let key = TrayKey::virtual_tray(&tray.id);
        let tray_id = self.trays.register(
            key.clone(),
            TrayView {
                key,
                slot,
                filament: Filament::Pending,
                color: None,
            },
        );
        if let Some(view) = self.slots.get_mut(slot) {
            view.trays = vec![tray_id];
        }
        2
    }

    /// Trays of a slot, in declared order.
    pub fn trays_of(&self, slot: SlotId) -> impl Iterator<Item = &TrayView> {
        self.slots
            .get(slot)
            .into_iter()
            .flat_map(|view| view.trays.iter())
            .filter_map(|&id| self.trays.get(id))
    }
}
