/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
//! ISO base media file format boxes, just enough of them to carry a single
//! HEIF item and to recognize the container flavour from its `ftyp`.
use crate::err::CoderError;
use std::fmt::Display;

pub(crate) type FourCc = [u8; 4];

/// Container flavour as announced by `ftyp` brands
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MimeType {
    Heic,
    Heif,
    HeicSequence,
    HeifSequence,
    Avif,
    AvifSequence,
    Unknown,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Heic => "image/heic",
            MimeType::Heif => "image/heif",
            MimeType::HeicSequence => "image/heic-sequence",
            MimeType::HeifSequence => "image/heif-sequence",
            MimeType::Avif => "image/avif",
            MimeType::AvifSequence => "image/avif-sequence",
            MimeType::Unknown => "",
        }
    }

    /// HEIC or generic HEIF, single image or sequence
    pub fn is_heif(&self) -> bool {
        matches!(
            self,
            MimeType::Heic | MimeType::Heif | MimeType::HeicSequence | MimeType::HeifSequence
        )
    }

    pub fn is_avif(&self) -> bool {
        matches!(self, MimeType::Avif | MimeType::AvifSequence)
    }

    fn from_brand(brand: &FourCc) -> Option<MimeType> {
        match brand {
            b"heic" | b"heix" | b"heim" | b"heis" => Some(MimeType::Heic),
            b"hevc" | b"hevx" | b"hevm" | b"hevs" => Some(MimeType::HeicSequence),
            b"avif" => Some(MimeType::Avif),
            b"avis" => Some(MimeType::AvifSequence),
            b"mif1" => Some(MimeType::Heif),
            b"msf1" => Some(MimeType::HeifSequence),
            _ => None,
        }
    }
}

impl Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MimeType::Unknown => f.write_str("unknown"),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Recognizes container flavour from the leading `ftyp` box.
///
/// Major brand decides first, compatible brands are consulted in order after
/// it. Anything that does not start with `ftyp` is [MimeType::Unknown].
pub fn probe_mime_type(data: &[u8]) -> MimeType {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return MimeType::Unknown;
    }
    let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let end = declared.min(data.len());
    let major = [data[8], data[9], data[10], data[11]];
    if let Some(mime) = MimeType::from_brand(&major) {
        return mime;
    }
    if end <= 16 {
        return MimeType::Unknown;
    }
    data[16..end]
        .chunks_exact(4)
        .find_map(|brand| MimeType::from_brand(&[brand[0], brand[1], brand[2], brand[3]]))
        .unwrap_or(MimeType::Unknown)
}

/// Big endian field reader, every short read is [CoderError::UnreadableSource]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data, position: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub(crate) fn bytes(&mut self, count: usize) -> Result<&'a [u8], CoderError> {
        let end = self
            .position
            .checked_add(count)
            .ok_or(CoderError::UnreadableSource)?;
        let slice = self
            .data
            .get(self.position..end)
            .ok_or(CoderError::UnreadableSource)?;
        self.position = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, CoderError> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, CoderError> {
        let v = self.bytes(2)?;
        Ok(u16::from_be_bytes([v[0], v[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CoderError> {
        let v = self.bytes(4)?;
        Ok(u32::from_be_bytes([v[0], v[1], v[2], v[3]]))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CoderError> {
        let v = self.bytes(8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(v);
        Ok(u64::from_be_bytes(word))
    }

    /// Reads `size` bytes wide unsigned integer, `size` is 0, 4 or 8
    pub(crate) fn sized(&mut self, size: u8) -> Result<u64, CoderError> {
        match size {
            0 => Ok(0),
            4 => Ok(self.u32()? as u64),
            8 => self.u64(),
            _ => Err(CoderError::UnreadableSource),
        }
    }

    pub(crate) fn fourcc(&mut self) -> Result<FourCc, CoderError> {
        let v = self.bytes(4)?;
        Ok([v[0], v[1], v[2], v[3]])
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct IsoBox<'a> {
    pub(crate) kind: FourCc,
    pub(crate) payload: &'a [u8],
}

impl<'a> IsoBox<'a> {
    /// Splits full box header off the payload
    pub(crate) fn full(&self) -> Result<(u8, u32, &'a [u8]), CoderError> {
        if self.payload.len() < 4 {
            return Err(CoderError::UnreadableSource);
        }
        let version = self.payload[0];
        let flags = u32::from_be_bytes([0, self.payload[1], self.payload[2], self.payload[3]]);
        Ok((version, flags, &self.payload[4..]))
    }
}

/// Splits a run of sibling boxes
pub(crate) fn read_boxes(data: &[u8]) -> Result<Vec<IsoBox<'_>>, CoderError> {
    let mut boxes = Vec::new();
    let mut reader = ByteReader::new(data);
    while reader.remaining() > 0 {
        let start = reader.position;
        let size = reader.u32()? as u64;
        let kind = reader.fourcc()?;
        let size = match size {
            0 => (data.len() - start) as u64,
            1 => reader.u64()?,
            v => v,
        };
        let header = (reader.position - start) as u64;
        if size < header {
            return Err(CoderError::UnreadableSource);
        }
        let payload = reader.bytes((size - header) as usize)?;
        boxes.push(IsoBox { kind, payload });
    }
    Ok(boxes)
}

pub(crate) fn find_box<'a, 'b>(boxes: &'b [IsoBox<'a>], kind: &FourCc) -> Option<&'b IsoBox<'a>> {
    boxes.iter().find(|x| &x.kind == kind)
}

pub(crate) fn write_box(out: &mut Vec<u8>, kind: &FourCc, body: &[u8]) {
    let size = body.len() as u64 + 8;
    if size > u32::MAX as u64 {
        out.extend_from_slice(&1u32.to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(&(size + 8).to_be_bytes());
    } else {
        out.extend_from_slice(&(size as u32).to_be_bytes());
        out.extend_from_slice(kind);
    }
    out.extend_from_slice(body);
}

pub(crate) fn write_full_box(
    out: &mut Vec<u8>,
    kind: &FourCc,
    version: u8,
    flags: u32,
    body: &[u8],
) {
    let mut full = Vec::with_capacity(body.len() + 4);
    full.push(version);
    full.extend_from_slice(&flags.to_be_bytes()[1..]);
    full.extend_from_slice(body);
    write_box(out, kind, &full);
}
