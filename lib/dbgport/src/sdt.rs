use crate::{checksum, TableError};
use core::fmt;
use scroll::{ctx::TryFromCtx, Endian, Pread, LE};

/// The four-character signature that identifies an ACPI table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 4]);

impl Signature {
    pub const DBG2: Signature = Signature(*b"DBG2");
    pub const DBGP: Signature = Signature(*b"DBGP");
    pub const SPCR: Signature = Signature(*b"SPCR");

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.as_str())
    }
}

/// The header every System Description Table starts with.
#[derive(Clone, Copy, Debug, Pread)]
#[repr(C)]
pub struct SdtHeader {
    pub signature: [u8; 4],
    /// Length of the entire table, including this header.
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl SdtHeader {
    /// Size of the header in the table, which is not the same as `mem::size_of::<SdtHeader>()`.
    pub const SIZE: usize = 36;

    pub fn signature(&self) -> Signature {
        Signature(self.signature)
    }
}

/// A view of a System Description Table. The view covers exactly the number of bytes the table's
/// header declares, and all reads go through it, so no offset taken from the table can reach
/// memory outside of it.
#[derive(Clone, Copy, Debug)]
pub struct Sdt<'a> {
    header: SdtHeader,
    bytes: &'a [u8],
}

impl<'a> Sdt<'a> {
    /// Create a view of the table at the start of `bytes`. `bytes` may extend past the end of the
    /// table, but must contain at least as many bytes as the header says the table is long.
    pub fn new(bytes: &'a [u8]) -> Result<Sdt<'a>, TableError> {
        let header = read_header(bytes)?;
        let length = header.length as usize;
        if length > bytes.len() {
            return Err(TableError::TooShort);
        }

        Ok(Sdt { header, bytes: &bytes[..length] })
    }

    pub fn header(&self) -> &SdtHeader {
        &self.header
    }

    pub fn signature(&self) -> Signature {
        self.header.signature()
    }

    pub fn revision(&self) -> u8 {
        self.header.revision
    }

    /// The bytes of the whole table, including the header.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn validate_checksum(&self) -> bool {
        checksum::validate(self.bytes)
    }

    /// Read a `T` at `offset` bytes from the start of the table.
    pub fn read<T>(&self, offset: usize) -> Result<T, TableError>
    where
        T: TryFromCtx<'a, Endian, Error = scroll::Error>,
    {
        self.bytes.pread_with::<T>(offset, LE).map_err(|_| TableError::OutOfBounds)
    }

    /// Get `length` bytes starting at `offset` from the start of the table.
    pub fn slice(&self, offset: usize, length: usize) -> Result<&'a [u8], TableError> {
        let end = offset.checked_add(length).ok_or(TableError::OutOfBounds)?;
        self.bytes.get(offset..end).ok_or(TableError::OutOfBounds)
    }
}

/// Read a table header from the start of `bytes`, making sure the length it declares could at
/// least hold the header itself.
pub(crate) fn read_header(bytes: &[u8]) -> Result<SdtHeader, TableError> {
    let header = bytes.pread_with::<SdtHeader>(0, LE).map_err(|_| TableError::TooShort)?;
    if (header.length as usize) < SdtHeader::SIZE {
        return Err(TableError::TooShort);
    }

    Ok(header)
}
