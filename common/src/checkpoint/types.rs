use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

/// A recorded value, valid from `sequence` until the next checkpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Sequence number (block height or snapshot epoch) of the change
    pub sequence: u64,
    /// Value from that point on
    pub value: u64,
}

impl Checkpoint {
    pub fn new(sequence: u64, value: u64) -> Self {
        Self { sequence, value }
    }
}

impl Serializer for Checkpoint {
    fn write(&self, writer: &mut Writer) {
        self.sequence.write(writer);
        self.value.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let sequence = reader.read()?;
        let value = reader.read()?;
        Ok(Self { sequence, value })
    }

    fn size(&self) -> usize {
        self.sequence.size() + self.value.size()
    }
}

/// Independent histories kept in one store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Free-form values recorded by hosts
    Values,
    /// Delegated voting power, keyed by block height
    Votes,
    /// Balances keyed by snapshot epoch
    SnapshotBalances,
}

impl Namespace {
    pub fn to_byte(self) -> u8 {
        match self {
            Namespace::Values => 0,
            Namespace::Votes => 1,
            Namespace::SnapshotBalances => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Namespace::Values),
            1 => Some(Namespace::Votes),
            2 => Some(Namespace::SnapshotBalances),
            _ => None,
        }
    }
}

impl Serializer for Namespace {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.to_byte());
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Namespace::from_byte(reader.read_u8()?).ok_or(ReaderError::InvalidValue)
    }

    fn size(&self) -> usize {
        1
    }
}

/// What a series tracks: one account, or the aggregate total
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKey {
    Account(Address),
    Total,
}

impl From<Address> for CheckpointKey {
    fn from(account: Address) -> Self {
        CheckpointKey::Account(account)
    }
}

impl Serializer for CheckpointKey {
    fn write(&self, writer: &mut Writer) {
        match self {
            CheckpointKey::Account(account) => {
                writer.write_u8(0);
                account.write(writer);
            }
            CheckpointKey::Total => writer.write_u8(1),
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        match reader.read_u8()? {
            0 => Ok(CheckpointKey::Account(reader.read()?)),
            1 => Ok(CheckpointKey::Total),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    fn size(&self) -> usize {
        match self {
            CheckpointKey::Account(account) => 1 + account.size(),
            CheckpointKey::Total => 1,
        }
    }
}
