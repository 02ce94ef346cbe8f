use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{CheckValue, Checksum, Kernel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Removed,
    Full(u64, u64),
}

/// # Description
/// fixed capacity open addressing table with linear probing and tombstones.
/// keys are scattered over the whole table so nearly every operation misses the cache
#[derive(Debug)]
pub struct HashTable {
    slots: Vec<Slot>,
    len: usize,
}

impl HashTable {
    /// `capacity` is rounded up to a power of two
    pub fn with_capacity(capacity: usize) -> Self {
        HashTable {
            slots: vec![Slot::Empty; capacity.max(1).next_power_of_two()],
            len: 0,
        }
    }

    fn home(&self, key: u64) -> usize {
        // fibonacci hashing
        let hash = key.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (hash >> 32) as usize & (self.slots.len() - 1)
    }

    fn find(&self, key: u64) -> Option<usize> {
        let mask = self.slots.len() - 1;
        let mut idx = self.home(key);
        for _ in 0..self.slots.len() {
            match self.slots[idx] {
                Slot::Empty => return None,
                Slot::Full(k, _) if k == key => return Some(idx),
                _ => idx = (idx + 1) & mask,
            }
        }
        None
    }

    /// # Return
    /// `false` if the table is full, an existing key has its value replaced
    pub fn insert(&mut self, key: u64, value: u64) -> bool {
        if let Some(idx) = self.find(key) {
            self.slots[idx] = Slot::Full(key, value);
            return true;
        }
        let mask = self.slots.len() - 1;
        let mut idx = self.home(key);
        for _ in 0..self.slots.len() {
            match self.slots[idx] {
                Slot::Empty | Slot::Removed => {
                    self.slots[idx] = Slot::Full(key, value);
                    self.len += 1;
                    return true;
                }
                Slot::Full(..) => idx = (idx + 1) & mask,
            }
        }
        false
    }

    pub fn get(&self, key: u64) -> Option<u64> {
        self.find(key).and_then(|idx| match self.slots[idx] {
            Slot::Full(_, v) => Some(v),
            _ => None,
        })
    }

    pub fn remove(&mut self, key: u64) -> Option<u64> {
        let idx = self.find(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Removed) {
            Slot::Full(_, v) => {
                self.len -= 1;
                Some(v)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HashOpsParams {
    pub capacity: usize,
    pub operations: usize,
    pub seed: u64,
}

impl Default for HashOpsParams {
    fn default() -> Self {
        HashOpsParams {
            capacity: 1 << 16,
            operations: 40_000,
            seed: super::DEFAULT_SEED,
        }
    }
}

/// insert random keys, look up a mix of present and absent keys, remove every fourth key
pub struct HashOps {
    params: HashOpsParams,
}

impl HashOps {
    pub fn new(params: HashOpsParams) -> Self {
        HashOps { params }
    }
}

impl Kernel for HashOps {
    fn name(&self) -> &'static str {
        "hash_ops"
    }

    fn description(&self) -> &'static str {
        "open addressing hash table insert/lookup/remove with random keys"
    }

    fn run(&self) -> Checksum {
        let HashOpsParams {
            capacity,
            operations,
            seed,
        } = self.params;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut table = HashTable::with_capacity(capacity);

        let keys: Vec<u64> = (0..operations).map(|_| rng.gen()).collect();
        let mut inserted = 0i64;
        for (i, key) in keys.iter().enumerate() {
            if table.insert(*key, i as u64) {
                inserted += 1;
            }
        }

        let mut found = 0i64;
        let mut value_sum = 0u64;
        for (i, key) in keys.iter().enumerate() {
            // every other probe is a key that was never inserted
            let probe = if i % 2 == 0 { *key } else { rng.gen() };
            if let Some(v) = table.get(probe) {
                found += 1;
                value_sum = value_sum.wrapping_add(v);
            }
        }

        let mut removed = 0i64;
        for key in keys.iter().step_by(4) {
            if table.remove(*key).is_some() {
                removed += 1;
            }
        }

        Checksum::new()
            .with("inserted", CheckValue::Int(inserted))
            .with("found", CheckValue::Int(found))
            .with("removed", CheckValue::Int(removed))
            .with("remaining", CheckValue::Int(table.len() as i64))
            .with("value_sum", CheckValue::Int(value_sum as i64))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_table_basic() {
        let mut table = HashTable::with_capacity(6);
        assert!(table.is_empty());
        assert!(table.insert(1, 10));
        assert!(table.insert(2, 20));
        assert!(table.insert(1, 11));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(11));
        assert_eq!(table.remove(1), Some(11));
        assert_eq!(table.remove(1), None);
        assert_eq!(table.get(1), None);
        assert_eq!(table.get(2), Some(20));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_full() {
        let mut table = HashTable::with_capacity(4);
        for key in 0..4 {
            assert!(table.insert(key, key));
        }
        assert!(!table.insert(99, 99));
        assert_eq!(table.get(99), None);
        // a tombstone is reused
        table.remove(0);
        assert!(table.insert(99, 99));
        assert_eq!(table.get(99), Some(99));
        assert_eq!(table.get(3), Some(3));
    }

    #[test]
    fn test_kernel_counts() {
        let params = HashOpsParams {
            capacity: 1 << 12,
            operations: 1000,
            seed: 3,
        };
        let checksum = HashOps::new(params).run();
        // 64 bit random keys don't collide at this size
        assert_eq!(checksum.get("inserted"), Some(CheckValue::Int(1000)));
        assert_eq!(checksum.get("found"), Some(CheckValue::Int(500)));
        assert_eq!(checksum.get("removed"), Some(CheckValue::Int(250)));
        assert_eq!(checksum.get("remaining"), Some(CheckValue::Int(750)));
        // values of the even keys: 0 + 2 + ... + 998
        assert_eq!(checksum.get("value_sum"), Some(CheckValue::Int(249_500)));
        assert_eq!(checksum, HashOps::new(params).run());
    }
}
