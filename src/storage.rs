//! Persistence of the configured durations.
//!
//! The state machine loads durations once at start-up and saves them when the
//! operator leaves the duration editors. [`DefaultStore`] keeps nothing and
//! always yields the factory values; [`FlashStore`] keeps a small checksummed
//! record on any [`embedded_storage::Storage`] device.

use embedded_storage::Storage;

use crate::types::Durations;

/// Size of one persisted record in bytes.
pub const RECORD_LEN: usize = 8;

const MAGIC: [u8; 2] = *b"TL";
const VERSION: u8 = 1;
const CRC_OFFSET: usize = RECORD_LEN - 2;

/// Trait for abstracting where durations are kept between power cycles.
pub trait DurationStore {
    /// Backend error type.
    type Error;

    /// Reads the stored durations.
    fn load(&mut self) -> Result<Durations, Self::Error>;

    /// Replaces the stored durations.
    fn save(&mut self, durations: &Durations) -> Result<(), Self::Error>;
}

/// A store that persists nothing and always loads [`Durations::DEFAULT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStore;

impl DurationStore for DefaultStore {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Result<Durations, Self::Error> {
        Ok(Durations::DEFAULT)
    }

    fn save(&mut self, _durations: &Durations) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Errors from [`FlashStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// The storage device reported an error.
    Storage(E),

    /// The stored record is missing, from another version, fails its checksum,
    /// or holds an out-of-range duration.
    Corrupt,
}

impl<E: core::fmt::Debug> core::fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Storage(err) => write!(f, "storage error: {:?}", err),
            StoreError::Corrupt => write!(f, "stored durations are corrupt"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for StoreError<E> {}

/// Durations kept in a fixed-size record at `offset` on a storage device.
///
/// Record layout (little endian):
///
/// | bytes | content |
/// |---|---|
/// | 0..2 | magic `"TL"` |
/// | 2 | format version |
/// | 3..6 | red, yellow, green seconds |
/// | 6..8 | CRC-16/CCITT-FALSE over bytes 0..6 |
pub struct FlashStore<S> {
    storage: S,
    offset: u32,
}

impl<S: Storage> FlashStore<S> {
    /// Uses the record at `offset` on `storage`.
    pub fn new(storage: S, offset: u32) -> Self {
        Self { storage, offset }
    }

    /// Returns the storage device.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Returns a reference to the storage device.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> DurationStore for FlashStore<S> {
    type Error = StoreError<S::Error>;

    fn load(&mut self) -> Result<Durations, Self::Error> {
        let mut record = [0u8; RECORD_LEN];
        self.storage
            .read(self.offset, &mut record)
            .map_err(StoreError::Storage)?;
        decode(&record).ok_or(StoreError::Corrupt)
    }

    fn save(&mut self, durations: &Durations) -> Result<(), Self::Error> {
        let record = encode(durations);
        self.storage
            .write(self.offset, &record)
            .map_err(StoreError::Storage)
    }
}

/// Serializes durations into a record.
pub fn encode(durations: &Durations) -> [u8; RECORD_LEN] {
    let mut record = [0u8; RECORD_LEN];
    record[..2].copy_from_slice(&MAGIC);
    record[2] = VERSION;
    record[3] = durations.red;
    record[4] = durations.yellow;
    record[5] = durations.green;
    let crc = crc16_ccitt_false(&record[..CRC_OFFSET]);
    record[CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
    record
}

/// Parses a record, returning `None` if it is not a valid duration record.
pub fn decode(record: &[u8; RECORD_LEN]) -> Option<Durations> {
    if record[..2] != MAGIC || record[2] != VERSION {
        return None;
    }

    let stored = u16::from_le_bytes([record[CRC_OFFSET], record[CRC_OFFSET + 1]]);
    if stored != crc16_ccitt_false(&record[..CRC_OFFSET]) {
        return None;
    }

    Durations::new(record[3], record[4], record[5])
}

fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
