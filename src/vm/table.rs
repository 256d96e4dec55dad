use std::rc::Rc;

use crate::vm::value::{StrObj, Value, fnv1a};

const INITIAL_CAPACITY: usize = 8;

/// A slot is in one of three states:
/// free (no key, `Nil` value), tombstone (no key, `Bool(true)` value),
/// or live (key present).
#[derive(Debug, Clone)]
struct Entry {
    key: Option<Rc<StrObj>>,
    value: Value,
}

impl Entry {
    fn free() -> Self {
        Self {
            key: None,
            value: Value::Nil,
        }
    }

    fn is_tombstone(&self) -> bool {
        self.key.is_none() && matches!(self.value, Value::Bool(true))
    }
}

/// Open-addressed hash table with linear probing, keyed by interned strings.
/// `count` includes tombstones, so the load check keeps at least one truly
/// free slot for probe termination.
#[derive(Debug, Default)]
pub struct Table {
    count: usize,
    entries: Vec<Entry>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns true when the key was not present.
    pub fn set(&mut self, key: Rc<StrObj>, value: Value) -> bool {
        if (self.count + 1) * 4 > self.entries.len() * 3 {
            self.grow();
        }
        let index = self.find_slot(&key);
        let entry = &mut self.entries[index];
        let is_new = entry.key.is_none();
        if is_new && !entry.is_tombstone() {
            self.count += 1;
        }
        entry.key = Some(key);
        entry.value = value;
        is_new
    }

    pub fn get(&self, key: &Rc<StrObj>) -> Option<&Value> {
        if self.entries.is_empty() {
            return None;
        }
        let mut index = key.hash() as usize % self.entries.len();
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None if !entry.is_tombstone() => return None,
                Some(k) if Rc::ptr_eq(k, key) => return Some(&entry.value),
                _ => index = (index + 1) % self.entries.len(),
            }
        }
    }

    /// Convert the entry to a tombstone. `count` stays put so probe chains
    /// running through this slot remain intact.
    pub fn delete(&mut self, key: &Rc<StrObj>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let mut index = key.hash() as usize % self.entries.len();
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None if !entry.is_tombstone() => return false,
                Some(k) if Rc::ptr_eq(k, key) => {
                    self.entries[index] = Entry {
                        key: None,
                        value: Value::Bool(true),
                    };
                    return true;
                }
                _ => index = (index + 1) % self.entries.len(),
            }
        }
    }

    /// Copy every live entry from `other` into `self`.
    pub fn add_all(&mut self, other: &Table) {
        for entry in &other.entries {
            if let Some(key) = &entry.key {
                self.set(Rc::clone(key), entry.value.clone());
            }
        }
    }

    /// Structural lookup for interning: matches on hash and byte content
    /// rather than pointer identity.
    pub fn find_string(&self, text: &str, hash: u32) -> Option<Rc<StrObj>> {
        if self.entries.is_empty() {
            return None;
        }
        let mut index = hash as usize % self.entries.len();
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None if !entry.is_tombstone() => return None,
                Some(k) if k.hash() == hash && k.as_str() == text => {
                    return Some(Rc::clone(k));
                }
                _ => index = (index + 1) % self.entries.len(),
            }
        }
    }

    /// Slot for inserting `key`: the live entry holding it, or the first
    /// tombstone seen on the probe chain, or the free slot that ended it.
    fn find_slot(&self, key: &Rc<StrObj>) -> usize {
        let mut index = key.hash() as usize % self.entries.len();
        let mut tombstone = None;
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None => {
                    if entry.is_tombstone() {
                        tombstone.get_or_insert(index);
                    } else {
                        return tombstone.unwrap_or(index);
                    }
                }
                Some(k) if Rc::ptr_eq(k, key) => return index,
                Some(_) => {}
            }
            index = (index + 1) % self.entries.len();
        }
    }

    /// Double the capacity, reinserting live entries at their natural probe
    /// positions. Tombstones are dropped and `count` recomputed.
    fn grow(&mut self) {
        let new_capacity = if self.entries.is_empty() {
            INITIAL_CAPACITY
        } else {
            self.entries.len() * 2
        };
        let old = std::mem::replace(&mut self.entries, vec![Entry::free(); new_capacity]);
        self.count = 0;
        for entry in old {
            if let Some(key) = entry.key {
                let mut index = key.hash() as usize % self.entries.len();
                while self.entries[index].key.is_some() {
                    index = (index + 1) % self.entries.len();
                }
                self.entries[index] = Entry {
                    key: Some(key),
                    value: entry.value,
                };
                self.count += 1;
            }
        }
    }
}

/// String intern pool: equal byte sequences resolve to one `Rc<StrObj>`, so
/// string equality reduces to pointer comparison. Keys double as the owned
/// objects; values are unused.
#[derive(Debug, Default)]
pub struct Strings {
    table: Table,
}

impl Strings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: String) -> Rc<StrObj> {
        let hash = fnv1a(text.as_bytes());
        if let Some(existing) = self.table.find_string(&text, hash) {
            return existing;
        }
        let obj = Rc::new(StrObj::new(text));
        self.table.set(Rc::clone(&obj), Value::Nil);
        obj
    }
}
