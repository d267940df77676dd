use std::io::{self, BufWriter, Seek, SeekFrom, Write};

use anyhow::{Result, bail};

use rla::structs::pcm::PcmBuffer;

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// RIFF WAV file writer for 16-bit PCM audio
pub struct WavWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    riff_size_position: u64,
    data_size_position: u64,
    data_written: u32,
    sample_rate: u32,
    channels: u32,
}

impl<W: Write + Seek> WavWriter<W> {
    /// Create a new WAV writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            riff_size_position: 0,
            data_size_position: 0,
            data_written: 0,
            sample_rate: 44100,
            channels: 2,
        }
    }

    /// Configure audio format parameters
    pub fn configure_audio_format(&mut self, sample_rate: u32, channels: u32) -> io::Result<()> {
        if self.data_written > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot change format after writing data",
            ));
        }

        self.sample_rate = sample_rate;
        self.channels = channels;
        Ok(())
    }

    /// Write the RIFF/fmt/data headers
    pub fn write_header(&mut self) -> io::Result<()> {
        // RIFF chunk
        self.writer.write_all(&RIFF_TAG)?;
        self.riff_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // RIFF size (updated later)
        self.writer.write_all(&WAVE_TAG)?;

        // fmt chunk
        self.writer.write_all(&FMT_TAG)?;
        self.writer.write_all(&16u32.to_le_bytes())?;
        self.writer.write_all(&FORMAT_PCM.to_le_bytes())?;
        self.writer
            .write_all(&(self.channels as u16).to_le_bytes())?;
        self.writer.write_all(&self.sample_rate.to_le_bytes())?;

        let byte_rate = self.sample_rate * self.channels * u32::from(BITS_PER_SAMPLE / 8);
        self.writer.write_all(&byte_rate.to_le_bytes())?;

        let block_align = self.channels as u16 * (BITS_PER_SAMPLE / 8);
        self.writer.write_all(&block_align.to_le_bytes())?;
        self.writer.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

        // data chunk
        self.writer.write_all(&DATA_TAG)?;
        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // data size (updated later)

        Ok(())
    }

    /// Write 16-bit PCM samples as little-endian
    pub fn write_pcm_16bit(&mut self, samples: &[i16]) -> io::Result<()> {
        for &sample in samples {
            self.writer.write_all(&sample.to_le_bytes())?;
            self.data_written += 2;
        }
        Ok(())
    }

    /// Finish writing and update the chunk size headers
    pub fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;

        let end_position = self.writer.stream_position()?;

        // data chunk payload size
        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&self.data_written.to_le_bytes())?;

        // RIFF size covers everything after its own size field
        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        let riff_size = (end_position - self.riff_size_position - 4) as u32;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end_position))?;
        self.writer.flush()?;

        Ok(())
    }

    /// Get the underlying writer
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

/// Parser for 16-bit PCM WAV data.
pub struct WavReader;

impl WavReader {
    /// Parses an in-memory WAV file into a PCM buffer.
    ///
    /// Only canonical 16-bit PCM is accepted, mono or stereo; anything else
    /// is rejected the same way the encoder rejects it.
    pub fn parse(data: &[u8]) -> Result<PcmBuffer> {
        if data.len() < 12 || data[0..4] != RIFF_TAG || data[8..12] != WAVE_TAG {
            bail!("not a RIFF/WAVE file");
        }

        let mut format: Option<(u16, u32)> = None;
        let mut samples: Option<Vec<i16>> = None;

        let mut offset = 12usize;
        while offset + 8 <= data.len() {
            let tag: [u8; 4] = data[offset..offset + 4].try_into()?;
            let size = u32::from_le_bytes(data[offset + 4..offset + 8].try_into()?) as usize;
            let body_start = offset + 8;
            let Some(body) = data.get(body_start..body_start + size) else {
                bail!("chunk {} overruns the file", String::from_utf8_lossy(&tag));
            };

            match tag {
                FMT_TAG => {
                    if size < 16 {
                        bail!("fmt chunk too short");
                    }

                    let audio_format = u16::from_le_bytes(body[0..2].try_into()?);
                    if audio_format != FORMAT_PCM {
                        bail!("file is not PCM format");
                    }

                    let bits = u16::from_le_bytes(body[14..16].try_into()?);
                    if bits != BITS_PER_SAMPLE {
                        bail!("file is not PCM 16 format, got {bits} bits per sample");
                    }

                    let channels = u16::from_le_bytes(body[2..4].try_into()?);
                    let sample_rate = u32::from_le_bytes(body[4..8].try_into()?);
                    format = Some((channels, sample_rate));
                }
                DATA_TAG => {
                    samples = Some(
                        body.chunks_exact(2)
                            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                            .collect(),
                    );
                }
                _ => {}
            }

            // Chunks are padded to even byte boundaries.
            offset = body_start + size + (size & 1);
        }

        let Some((channels, sample_rate)) = format else {
            bail!("missing fmt chunk");
        };
        let Some(samples) = samples else {
            bail!("missing data chunk");
        };

        if channels == 0 || channels > 2 {
            bail!("input must be mono (1 channel) or stereo (2 channels), got {channels}");
        }

        Ok(PcmBuffer::new(sample_rate, channels as u8, samples)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_wav(pcm: &PcmBuffer) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(cursor);

        writer
            .configure_audio_format(pcm.sample_rate(), u32::from(pcm.channels()))
            .unwrap();
        writer.write_header().unwrap();
        writer.write_pcm_16bit(pcm.samples()).unwrap();
        writer.finish().unwrap();

        writer.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_wav_header_write() {
        let pcm = PcmBuffer::new(48000, 2, vec![0i16; 8]).unwrap();
        let buffer = write_wav(&pcm);

        assert_eq!(&buffer[0..4], b"RIFF");
        assert_eq!(&buffer[8..12], b"WAVE");
        assert_eq!(&buffer[12..16], b"fmt ");
        assert_eq!(&buffer[36..40], b"data");

        // RIFF size = file size - 8, data size = sample bytes
        assert_eq!(
            u32::from_le_bytes(buffer[4..8].try_into().unwrap()),
            buffer.len() as u32 - 8
        );
        assert_eq!(u32::from_le_bytes(buffer[40..44].try_into().unwrap()), 16);
    }

    #[test]
    fn test_wav_round_trip() {
        let pcm = PcmBuffer::new(44100, 2, vec![0, -1, 32767, -32768, 250, -250]).unwrap();
        let buffer = write_wav(&pcm);

        let parsed = WavReader::parse(&buffer).unwrap();
        assert_eq!(parsed.sample_rate(), 44100);
        assert_eq!(parsed.channels(), 2);
        assert_eq!(parsed.samples(), pcm.samples());
    }

    #[test]
    fn test_non_wav_input_rejected() {
        assert!(WavReader::parse(b"OggS\x00\x00\x00\x00junkjunk").is_err());
        assert!(WavReader::parse(b"RIFF").is_err());
    }
}
