use byteorder::WriteBytesExt;
use bytes::Bytes;
use derive_new::new;

/// Index extension, kept as opaque bytes
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Extension {
    pub signature: [u8; 4],
    pub data: Bytes,
}

impl Extension {
    pub fn signature_str(&self) -> String {
        String::from_utf8_lossy(&self.signature).to_string()
    }

    /// Signature, big-endian size and data
    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(8 + self.data.len());
        bytes.extend_from_slice(&self.signature);
        bytes.write_u32::<byteorder::NetworkEndian>(u32::try_from(self.data.len())?)?;
        bytes.extend_from_slice(&self.data);

        Ok(Bytes::from(bytes))
    }
}
