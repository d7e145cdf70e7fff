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
//! Built-in backend storing interleaved samples as an uncompressed HEIF item.
//!
//! It writes and reads a complete single item container, so the color
//! pipeline can be driven end to end without a bitstream codec linked in.
//! Samples are stored losslessly whatever quality the encoder is given.
use crate::codec::{
    ChromaSubsampling, CodecImage, CompressionFormat, HeifCodec, HeifEncoder, ImageHandle,
    InterleavedChroma,
};
use crate::container::{
    find_box, read_boxes, write_box, write_full_box, ByteReader, FourCc, IsoBox,
};
use crate::err::{CoderError, EncoderParameter};
use crate::nclx::{ColorPrimaries, MatrixCoefficients, NclxProfile, TransferCharacteristics};
use crate::plane::try_alloc;
use crate::profile::ColorProfile;
use tracing::{debug, trace};

const ITEM_TYPE: &FourCc = b"unci";
const PRIMARY_ITEM_ID: u16 = 1;
const AVIF_BRANDS: &[&FourCc] = &[b"avif", b"mif1", b"miaf"];
const HEIC_BRANDS: &[&FourCc] = &[b"mif1", b"heic"];

#[derive(Debug, Default, Copy, Clone)]
pub struct UncompressedCodec;

impl UncompressedCodec {
    pub fn new() -> UncompressedCodec {
        UncompressedCodec
    }
}

impl HeifCodec for UncompressedCodec {
    fn primary_image<'a>(
        &self,
        data: &'a [u8],
    ) -> Result<Box<dyn ImageHandle + 'a>, CoderError> {
        Ok(Box::new(UncompressedHandle::parse(data)?))
    }

    fn encoder_for_format(
        &self,
        format: CompressionFormat,
    ) -> Result<Box<dyn HeifEncoder>, CoderError> {
        Ok(Box::new(UncompressedEncoder::new(format)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UncompressedHandle<'a> {
    width: usize,
    height: usize,
    channels: usize,
    bit_depth: u8,
    premultiplied: bool,
    icc: Option<Vec<u8>>,
    nclx: Option<NclxProfile>,
    samples: &'a [u8],
}

struct ItemLocation {
    offset: u64,
    length: u64,
}

fn parse_pitm(pitm: &IsoBox) -> Result<u16, CoderError> {
    let (version, _, body) = pitm.full()?;
    let mut reader = ByteReader::new(body);
    if version == 0 {
        reader.u16()
    } else {
        Ok(reader.u32()? as u16)
    }
}

fn parse_item_type(iinf: &IsoBox, item_id: u16) -> Result<Option<FourCc>, CoderError> {
    let (version, _, body) = iinf.full()?;
    let mut reader = ByteReader::new(body);
    let _entry_count = if version == 0 {
        reader.u16()? as u32
    } else {
        reader.u32()?
    };
    let entries = read_boxes(reader.bytes(reader.remaining())?)?;
    for infe in entries.iter().filter(|x| &x.kind == b"infe") {
        let (version, _, body) = infe.full()?;
        if version < 2 {
            continue;
        }
        let mut reader = ByteReader::new(body);
        let id = if version == 2 {
            reader.u16()?
        } else {
            reader.u32()? as u16
        };
        let _protection_index = reader.u16()?;
        let item_type = reader.fourcc()?;
        if id == item_id {
            return Ok(Some(item_type));
        }
    }
    Ok(None)
}

fn parse_iloc(iloc: &IsoBox, item_id: u16) -> Result<Option<ItemLocation>, CoderError> {
    let (version, _, body) = iloc.full()?;
    let mut reader = ByteReader::new(body);
    let sizes = reader.u8()?;
    let offset_size = sizes >> 4;
    let length_size = sizes & 0xf;
    let sizes = reader.u8()?;
    let base_offset_size = sizes >> 4;
    let index_size = if version == 1 || version == 2 {
        sizes & 0xf
    } else {
        0
    };
    let item_count = if version < 2 {
        reader.u16()? as u32
    } else {
        reader.u32()?
    };
    for _ in 0..item_count {
        let id = if version < 2 {
            reader.u16()? as u32
        } else {
            reader.u32()?
        };
        if version == 1 || version == 2 {
            let construction_method = reader.u16()? & 0xf;
            if construction_method != 0 && id == item_id as u32 {
                return Err(CoderError::UnreadableSource);
            }
        }
        let _data_reference_index = reader.u16()?;
        let base_offset = reader.sized(base_offset_size)?;
        let extent_count = reader.u16()?;
        let mut location = None;
        for _ in 0..extent_count {
            reader.sized(index_size)?;
            let offset = reader.sized(offset_size)?;
            let length = reader.sized(length_size)?;
            if location.is_none() {
                location = Some(ItemLocation {
                    offset: base_offset + offset,
                    length,
                });
            }
        }
        if id == item_id as u32 {
            if extent_count != 1 {
                return Err(CoderError::UnreadableSource);
            }
            return Ok(location);
        }
    }
    Ok(None)
}

/// Properties associated with the item, in association order
fn item_properties<'a>(
    iprp: &IsoBox<'a>,
    item_id: u16,
) -> Result<Vec<IsoBox<'a>>, CoderError> {
    let children = read_boxes(iprp.payload)?;
    let ipco = find_box(&children, b"ipco").ok_or(CoderError::UnreadableSource)?;
    let properties = read_boxes(ipco.payload)?;
    let mut associated = Vec::new();
    for ipma in children.iter().filter(|x| &x.kind == b"ipma") {
        let (version, flags, body) = ipma.full()?;
        let mut reader = ByteReader::new(body);
        let entry_count = reader.u32()?;
        for _ in 0..entry_count {
            let id = if version < 1 {
                reader.u16()? as u32
            } else {
                reader.u32()?
            };
            let association_count = reader.u8()?;
            for _ in 0..association_count {
                let index = if flags & 1 != 0 {
                    (reader.u16()? & 0x7fff) as usize
                } else {
                    (reader.u8()? & 0x7f) as usize
                };
                if id == item_id as u32 && index > 0 {
                    let property = properties
                        .get(index - 1)
                        .ok_or(CoderError::UnreadableSource)?;
                    associated.push(*property);
                }
            }
        }
    }
    Ok(associated)
}

fn has_premultiplied_reference(
    iref: Option<&IsoBox>,
    item_id: u16,
) -> Result<bool, CoderError> {
    let Some(iref) = iref else {
        return Ok(false);
    };
    let (version, _, body) = iref.full()?;
    for reference in read_boxes(body)?.iter().filter(|x| &x.kind == b"prem") {
        let mut reader = ByteReader::new(reference.payload);
        let from = if version == 0 {
            reader.u16()? as u32
        } else {
            reader.u32()?
        };
        if from == item_id as u32 {
            return Ok(true);
        }
    }
    Ok(false)
}

impl<'a> UncompressedHandle<'a> {
    pub(crate) fn parse(data: &'a [u8]) -> Result<UncompressedHandle<'a>, CoderError> {
        let boxes = read_boxes(data)?;
        if boxes.first().map(|x| &x.kind) != Some(b"ftyp") {
            return Err(CoderError::UnreadableSource);
        }
        let meta = find_box(&boxes, b"meta").ok_or(CoderError::UnreadableSource)?;
        let (_, _, meta_body) = meta.full()?;
        let children = read_boxes(meta_body)?;

        let item_id = match find_box(&children, b"pitm") {
            Some(pitm) => parse_pitm(pitm)?,
            None => return Err(CoderError::NoPrimaryImage),
        };
        let iinf = find_box(&children, b"iinf").ok_or(CoderError::NoPrimaryImage)?;
        let item_type = parse_item_type(iinf, item_id)?.ok_or(CoderError::NoPrimaryImage)?;
        if &item_type != ITEM_TYPE {
            debug!(
                "Primary item type {:?} is not decodable by the uncompressed backend",
                String::from_utf8_lossy(&item_type)
            );
            return Err(CoderError::UnreadableSource);
        }

        let iloc = find_box(&children, b"iloc").ok_or(CoderError::UnreadableSource)?;
        let location = parse_iloc(iloc, item_id)?.ok_or(CoderError::UnreadableSource)?;

        let iprp = find_box(&children, b"iprp").ok_or(CoderError::UnreadableSource)?;
        let properties = item_properties(iprp, item_id)?;

        let mut dimensions = None;
        let mut pixel_info = None;
        let mut icc = None;
        let mut nclx = None;
        for property in properties.iter() {
            match &property.kind {
                b"ispe" => {
                    let (_, _, body) = property.full()?;
                    let mut reader = ByteReader::new(body);
                    dimensions = Some((reader.u32()? as usize, reader.u32()? as usize));
                }
                b"pixi" => {
                    let (_, _, body) = property.full()?;
                    let mut reader = ByteReader::new(body);
                    let channels = reader.u8()? as usize;
                    let depths = reader.bytes(channels)?;
                    let bit_depth = depths.first().copied().unwrap_or(8);
                    if depths.iter().any(|&x| x != bit_depth) {
                        return Err(CoderError::UnsupportedBitDepth(-1));
                    }
                    pixel_info = Some((channels, bit_depth));
                }
                b"colr" => {
                    let mut reader = ByteReader::new(property.payload);
                    match &reader.fourcc()? {
                        b"nclx" => {
                            let primaries = ColorPrimaries::from(reader.u16()?);
                            let transfer = TransferCharacteristics::from(reader.u16()?);
                            let matrix = MatrixCoefficients::from(reader.u16()?);
                            let full_range = reader.u8()? & 0x80 != 0;
                            nclx = Some(NclxProfile::new(primaries, transfer, matrix, full_range));
                        }
                        b"prof" | b"rICC" => {
                            icc = Some(reader.bytes(reader.remaining())?.to_vec());
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let (width, height) = dimensions.ok_or(CoderError::UnreadableSource)?;
        let (channels, bit_depth) = pixel_info.ok_or(CoderError::UnreadableSource)?;
        if width == 0 || height == 0 || !(channels == 3 || channels == 4) {
            return Err(CoderError::UnreadableSource);
        }
        if bit_depth == 0 || bit_depth > 16 {
            return Err(CoderError::UnsupportedBitDepth(bit_depth as i32));
        }

        let mdat_start = location.offset as usize;
        let mdat_end = mdat_start
            .checked_add(location.length as usize)
            .ok_or(CoderError::UnreadableSource)?;
        let samples = data
            .get(mdat_start..mdat_end)
            .ok_or(CoderError::UnreadableSource)?;
        let sample_size = if bit_depth > 8 { 2 } else { 1 };
        let expected_len = width
            .checked_mul(height)
            .and_then(|x| x.checked_mul(channels * sample_size))
            .ok_or(CoderError::UnreadableSource)?;
        if samples.len() != expected_len {
            return Err(CoderError::UnreadableSource);
        }

        let premultiplied =
            has_premultiplied_reference(find_box(&children, b"iref"), item_id)?;

        trace!(
            "Parsed uncompressed item {}x{}, {} channels, {} bits",
            width,
            height,
            channels,
            bit_depth
        );

        Ok(UncompressedHandle {
            width,
            height,
            channels,
            bit_depth,
            premultiplied,
            icc,
            nclx,
            samples,
        })
    }

    fn sample(&self, index: usize) -> u16 {
        if self.bit_depth > 8 {
            u16::from_le_bytes([self.samples[index * 2], self.samples[index * 2 + 1]])
        } else {
            self.samples[index] as u16
        }
    }
}

impl ImageHandle for UncompressedHandle<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn chroma_bits_per_pixel(&self) -> i32 {
        self.bit_depth as i32
    }

    fn has_alpha_channel(&self) -> bool {
        self.channels == 4
    }

    fn is_premultiplied_alpha(&self) -> bool {
        self.premultiplied
    }

    fn icc_profile(&self) -> Option<Vec<u8>> {
        self.icc.clone()
    }

    fn nclx_profile(&self) -> Option<NclxProfile> {
        self.nclx
    }

    fn decode(&self, chroma: InterleavedChroma) -> Result<CodecImage, CoderError> {
        let (bit_depth, sample_size) = match chroma {
            InterleavedChroma::Rgba8 => (8u8, 1usize),
            InterleavedChroma::Rrggbbaa16Le => (self.bit_depth.max(8), 2usize),
        };
        let source_max = ((1u32 << self.bit_depth) - 1) as f32;
        let target_max = ((1u32 << bit_depth) - 1) as f32;
        let max_value = ((1u32 << self.bit_depth) - 1) as u16;
        let stride = self.width * 4 * sample_size;
        let mut data = try_alloc::<u8>(stride * self.height)?;
        for (i, dst) in data.chunks_exact_mut(4 * sample_size).enumerate() {
            for c in 0..4 {
                let value = if c < self.channels {
                    self.sample(i * self.channels + c)
                } else {
                    max_value
                };
                let value = if bit_depth == self.bit_depth {
                    value
                } else {
                    (value as f32 * target_max / source_max).round() as u16
                };
                if sample_size == 1 {
                    dst[c] = value as u8;
                } else {
                    dst[c * 2..c * 2 + 2].copy_from_slice(&value.to_le_bytes());
                }
            }
        }
        Ok(CodecImage {
            width: self.width,
            height: self.height,
            bit_depth,
            chroma,
            has_alpha: self.channels == 4,
            data,
            stride,
            premultiplied_alpha: self.premultiplied && self.channels == 4,
            profile: ColorProfile::None,
        })
    }
}

/// Encoder writing a single `unci` item container
#[derive(Debug, Clone)]
pub struct UncompressedEncoder {
    format: CompressionFormat,
    quality: Option<u8>,
    lossless: bool,
    chroma: ChromaSubsampling,
    speed: Option<u8>,
}

impl UncompressedEncoder {
    pub fn new(format: CompressionFormat) -> UncompressedEncoder {
        UncompressedEncoder {
            format,
            quality: None,
            lossless: false,
            chroma: ChromaSubsampling::Yuv420,
            speed: None,
        }
    }

    fn brands(&self) -> (&'static FourCc, &'static [&'static FourCc]) {
        match self.format {
            CompressionFormat::Av1 => (b"avif", AVIF_BRANDS),
            CompressionFormat::Hevc => (b"heic", HEIC_BRANDS),
        }
    }

    fn write_meta(
        &self,
        image: &CodecImage,
        channels: usize,
        data_offset: u32,
        data_length: u32,
    ) -> Vec<u8> {
        let mut children = Vec::new();

        let mut hdlr = Vec::new();
        hdlr.extend_from_slice(&0u32.to_be_bytes());
        hdlr.extend_from_slice(b"pict");
        hdlr.extend_from_slice(&[0u8; 12]);
        hdlr.push(0);
        write_full_box(&mut children, b"hdlr", 0, 0, &hdlr);

        write_full_box(&mut children, b"pitm", 0, 0, &PRIMARY_ITEM_ID.to_be_bytes());

        let mut infe = Vec::new();
        infe.extend_from_slice(&PRIMARY_ITEM_ID.to_be_bytes());
        infe.extend_from_slice(&0u16.to_be_bytes());
        infe.extend_from_slice(ITEM_TYPE);
        infe.push(0);
        let mut iinf = Vec::new();
        iinf.extend_from_slice(&1u16.to_be_bytes());
        write_full_box(&mut iinf, b"infe", 2, 0, &infe);
        write_full_box(&mut children, b"iinf", 0, 0, &iinf);

        let mut iloc = vec![0x44, 0x00];
        iloc.extend_from_slice(&1u16.to_be_bytes());
        iloc.extend_from_slice(&PRIMARY_ITEM_ID.to_be_bytes());
        iloc.extend_from_slice(&0u16.to_be_bytes());
        iloc.extend_from_slice(&1u16.to_be_bytes());
        iloc.extend_from_slice(&data_offset.to_be_bytes());
        iloc.extend_from_slice(&data_length.to_be_bytes());
        write_full_box(&mut children, b"iloc", 0, 0, &iloc);

        let mut ipco = Vec::new();
        let mut ispe = Vec::new();
        ispe.extend_from_slice(&(image.width as u32).to_be_bytes());
        ispe.extend_from_slice(&(image.height as u32).to_be_bytes());
        write_full_box(&mut ipco, b"ispe", 0, 0, &ispe);
        let mut pixi = vec![channels as u8];
        pixi.extend(std::iter::repeat(image.bit_depth).take(channels));
        write_full_box(&mut ipco, b"pixi", 0, 0, &pixi);
        let mut property_count = 2u8;
        match &image.profile {
            ColorProfile::Nclx(nclx) => {
                let mut colr = Vec::new();
                colr.extend_from_slice(b"nclx");
                colr.extend_from_slice(&nclx.color_primaries.code().to_be_bytes());
                colr.extend_from_slice(&nclx.transfer_characteristics.code().to_be_bytes());
                colr.extend_from_slice(&nclx.matrix_coefficients.code().to_be_bytes());
                colr.push(if nclx.full_range { 0x80 } else { 0 });
                write_box(&mut ipco, b"colr", &colr);
                property_count += 1;
            }
            ColorProfile::Icc(icc) => {
                let mut colr = Vec::with_capacity(icc.len() + 4);
                colr.extend_from_slice(b"prof");
                colr.extend_from_slice(icc);
                write_box(&mut ipco, b"colr", &colr);
                property_count += 1;
            }
            ColorProfile::None => {}
        }
        let mut ipma = Vec::new();
        ipma.extend_from_slice(&1u32.to_be_bytes());
        ipma.extend_from_slice(&PRIMARY_ITEM_ID.to_be_bytes());
        ipma.push(property_count);
        for index in 1..=property_count {
            // ispe is descriptive, the rest is essential
            ipma.push(if index == 1 { index } else { 0x80 | index });
        }
        let mut iprp = Vec::new();
        write_box(&mut iprp, b"ipco", &ipco);
        write_full_box(&mut iprp, b"ipma", 0, 0, &ipma);
        write_box(&mut children, b"iprp", &iprp);

        if image.premultiplied_alpha && image.has_alpha {
            let mut prem = Vec::new();
            prem.extend_from_slice(&PRIMARY_ITEM_ID.to_be_bytes());
            prem.extend_from_slice(&1u16.to_be_bytes());
            prem.extend_from_slice(&PRIMARY_ITEM_ID.to_be_bytes());
            let mut iref = Vec::new();
            write_box(&mut iref, b"prem", &prem);
            write_full_box(&mut children, b"iref", 0, 0, &iref);
        }

        let mut meta = Vec::new();
        write_full_box(&mut meta, b"meta", 0, 0, &children);
        meta
    }
}

impl HeifEncoder for UncompressedEncoder {
    fn set_lossy_quality(&mut self, quality: u8) -> Result<(), CoderError> {
        if !(1..=100).contains(&quality) {
            return Err(CoderError::EncoderConfigurationFailure(
                EncoderParameter::Quality,
            ));
        }
        self.quality = Some(quality);
        Ok(())
    }

    fn set_lossless(&mut self, lossless: bool) -> Result<(), CoderError> {
        self.lossless = lossless;
        Ok(())
    }

    fn set_chroma(&mut self, chroma: ChromaSubsampling) -> Result<(), CoderError> {
        if self.lossless && chroma != ChromaSubsampling::Yuv444 {
            return Err(CoderError::EncoderConfigurationFailure(
                EncoderParameter::Chroma,
            ));
        }
        self.chroma = chroma;
        Ok(())
    }

    fn set_speed(&mut self, speed: u8) -> Result<(), CoderError> {
        if !(1..=19).contains(&speed) {
            return Err(CoderError::EncoderConfigurationFailure(EncoderParameter::Speed));
        }
        self.speed = Some(speed);
        Ok(())
    }

    fn encode(self: Box<Self>, image: &CodecImage) -> Result<Vec<u8>, CoderError> {
        debug!(
            "Writing uncompressed {:?} container, quality {:?}, lossless {}, chroma {}, speed {:?}",
            self.format,
            self.quality,
            self.lossless,
            self.chroma.as_str(),
            self.speed
        );
        if image.width == 0 || image.height == 0 {
            return Err(CoderError::ZeroBaseSize);
        }
        let sample_size = match image.chroma {
            InterleavedChroma::Rgba8 => 1usize,
            InterleavedChroma::Rrggbbaa16Le => 2usize,
        };
        let channels = if image.has_alpha { 4 } else { 3 };
        let row_bytes = image
            .width
            .checked_mul(4 * sample_size)
            .ok_or(CoderError::UnreadableSource)?;
        let required = image
            .stride
            .checked_mul(image.height - 1)
            .and_then(|x| x.checked_add(row_bytes))
            .ok_or(CoderError::UnreadableSource)?;
        if image.stride < row_bytes || image.data.len() < required {
            return Err(CoderError::UnreadableSource);
        }

        let payload_len = image
            .width
            .checked_mul(image.height)
            .and_then(|x| x.checked_mul(channels * sample_size))
            .ok_or(CoderError::OutOfMemory)?;
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(payload_len)
            .map_err(|_| CoderError::OutOfMemory)?;
        for row in image.data.chunks(image.stride).take(image.height) {
            for px in row[..row_bytes].chunks_exact(4 * sample_size) {
                payload.extend_from_slice(&px[..channels * sample_size]);
            }
        }
        let data_length =
            u32::try_from(payload.len()).map_err(|_| CoderError::OutOfMemory)?;

        let (major, compatible) = self.brands();
        let mut ftyp_body = Vec::new();
        ftyp_body.extend_from_slice(major);
        ftyp_body.extend_from_slice(&0u32.to_be_bytes());
        for brand in compatible {
            ftyp_body.extend_from_slice(*brand);
        }
        let mut out = Vec::new();
        write_box(&mut out, b"ftyp", &ftyp_body);

        let placeholder = self.write_meta(image, channels, 0, data_length);
        let data_offset = u32::try_from(out.len() + placeholder.len() + 8)
            .map_err(|_| CoderError::OutOfMemory)?;
        let meta = self.write_meta(image, channels, data_offset, data_length);
        out.extend_from_slice(&meta);
        write_box(&mut out, b"mdat", &payload);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: usize, height: usize, has_alpha: bool, profile: ColorProfile) -> CodecImage {
        let data = (0..width * height * 4).map(|x| (x * 7 % 256) as u8).collect();
        CodecImage {
            width,
            height,
            bit_depth: 8,
            chroma: InterleavedChroma::Rgba8,
            has_alpha,
            data,
            stride: width * 4,
            premultiplied_alpha: false,
            profile,
        }
    }

    fn encode(image: &CodecImage) -> Vec<u8> {
        UncompressedCodec::new()
            .encoder_for_format(CompressionFormat::Av1)
            .unwrap()
            .encode(image)
            .unwrap()
    }

    #[test]
    fn samples_survive_container() {
        let source = image(3, 2, true, ColorProfile::None);
        let encoded = encode(&source);
        let handle = UncompressedHandle::parse(&encoded).unwrap();
        assert_eq!((handle.width(), handle.height()), (3, 2));
        assert!(handle.has_alpha_channel());
        assert_eq!(handle.chroma_bits_per_pixel(), 8);
        let decoded = handle.decode(InterleavedChroma::Rgba8).unwrap();
        assert_eq!(decoded.data, source.data);
    }

    #[test]
    fn opaque_images_gain_alpha_on_decode() {
        let source = image(2, 2, false, ColorProfile::None);
        let encoded = encode(&source);
        let handle = UncompressedHandle::parse(&encoded).unwrap();
        assert!(!handle.has_alpha_channel());
        let decoded = handle.decode(InterleavedChroma::Rgba8).unwrap();
        for (dst, src) in decoded.data.chunks_exact(4).zip(source.data.chunks_exact(4)) {
            assert_eq!(&dst[..3], &src[..3]);
            assert_eq!(dst[3], 255);
        }
    }

    #[test]
    fn profiles_are_stored() {
        let nclx = NclxProfile::new(
            ColorPrimaries::Bt2020,
            TransferCharacteristics::Hlg,
            MatrixCoefficients::Bt2020Ncl,
            true,
        );
        let encoded = encode(&image(1, 1, true, ColorProfile::Nclx(nclx)));
        let handle = UncompressedHandle::parse(&encoded).unwrap();
        assert_eq!(handle.nclx_profile(), Some(nclx));
        assert_eq!(handle.icc_profile(), None);

        let encoded = encode(&image(1, 1, true, ColorProfile::Icc(vec![9, 8, 7])));
        let handle = UncompressedHandle::parse(&encoded).unwrap();
        assert_eq!(handle.icc_profile(), Some(vec![9, 8, 7]));
    }

    #[test]
    fn premultiplied_flag_is_stored() {
        let mut source = image(1, 1, true, ColorProfile::None);
        source.premultiplied_alpha = true;
        let handle_data = encode(&source);
        let handle = UncompressedHandle::parse(&handle_data).unwrap();
        assert!(handle.is_premultiplied_alpha());
    }

    #[test]
    fn ten_bit_samples_are_scaled_for_eight_bit_output() {
        let mut data = Vec::new();
        for v in [1023u16, 0, 512, 1023] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let source = CodecImage {
            width: 1,
            height: 1,
            bit_depth: 10,
            chroma: InterleavedChroma::Rrggbbaa16Le,
            has_alpha: true,
            data: data.clone(),
            stride: 8,
            premultiplied_alpha: false,
            profile: ColorProfile::None,
        };
        let encoded = encode(&source);
        let handle = UncompressedHandle::parse(&encoded).unwrap();
        assert_eq!(handle.chroma_bits_per_pixel(), 10);
        let deep = handle.decode(InterleavedChroma::Rrggbbaa16Le).unwrap();
        assert_eq!(deep.data, data);
        assert_eq!(deep.bit_depth, 10);
        let shallow = handle.decode(InterleavedChroma::Rgba8).unwrap();
        assert_eq!(shallow.data, vec![255, 0, 128, 255]);
    }

    #[test]
    fn truncated_container_is_unreadable() {
        let encoded = encode(&image(4, 4, true, ColorProfile::None));
        let truncated = &encoded[..encoded.len() - 10];
        assert_eq!(
            UncompressedHandle::parse(truncated),
            Err(CoderError::UnreadableSource)
        );
        assert_eq!(
            UncompressedHandle::parse(&encoded[..30]),
            Err(CoderError::UnreadableSource)
        );
    }

    #[test]
    fn oversized_dimensions_are_unreadable() {
        let mut encoded = encode(&image(1, 1, true, ColorProfile::None));
        let ispe = encoded.windows(4).position(|x| x == b"ispe").unwrap();
        encoded[ispe + 8..ispe + 16].fill(0xff);
        assert_eq!(
            UncompressedHandle::parse(&encoded),
            Err(CoderError::UnreadableSource)
        );
    }

    #[test]
    fn oversized_source_is_rejected_by_encoder() {
        let mut source = image(1, 1, true, ColorProfile::None);
        source.width = usize::MAX;
        source.height = 2;
        let encoder = UncompressedCodec::new()
            .encoder_for_format(CompressionFormat::Av1)
            .unwrap();
        assert_eq!(encoder.encode(&source), Err(CoderError::UnreadableSource));
    }

    #[test]
    fn missing_primary_item() {
        let mut out = Vec::new();
        let mut ftyp = Vec::new();
        ftyp.extend_from_slice(b"avif");
        ftyp.extend_from_slice(&0u32.to_be_bytes());
        write_box(&mut out, b"ftyp", &ftyp);
        let mut hdlr = Vec::new();
        write_full_box(&mut hdlr, b"hdlr", 0, 0, &[0u8; 21]);
        write_full_box(&mut out, b"meta", 0, 0, &hdlr);
        assert_eq!(
            UncompressedHandle::parse(&out),
            Err(CoderError::NoPrimaryImage)
        );
    }

    #[test]
    fn encoder_validates_parameters() {
        let mut encoder = UncompressedEncoder::new(CompressionFormat::Hevc);
        assert_eq!(
            encoder.set_lossy_quality(0),
            Err(CoderError::EncoderConfigurationFailure(EncoderParameter::Quality))
        );
        assert_eq!(
            encoder.set_lossy_quality(101),
            Err(CoderError::EncoderConfigurationFailure(EncoderParameter::Quality))
        );
        assert_eq!(
            encoder.set_speed(20),
            Err(CoderError::EncoderConfigurationFailure(EncoderParameter::Speed))
        );
        assert!(encoder.set_speed(6).is_ok());
        encoder.set_lossless(true).unwrap();
        assert_eq!(
            encoder.set_chroma(ChromaSubsampling::Yuv420),
            Err(CoderError::EncoderConfigurationFailure(EncoderParameter::Chroma))
        );
        assert!(encoder.set_chroma(ChromaSubsampling::Yuv444).is_ok());
    }
}
