//! Bag of Cells (BoC) wire format.
//!
//! A BoC flattens a cell tree into a byte stream: an envelope (magic, flags,
//! counts, root indices), then each cell as descriptor bytes + padded data +
//! reference indices, then an optional CRC32-C trailer. Cells with equal
//! hashes are stored once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    crc32c, Cell, CellError, CellResult, BOC_GENERIC_MAGIC, BOC_INDEXED_CRC32_MAGIC,
    BOC_INDEXED_MAGIC,
};

/// A serialized collection of cells.
///
/// The writer emits cells root-first: the root has index 0 and every
/// reference points to a higher index, which is the ordering the network's
/// deserializer expects. The reader also accepts children-first BoCs and the
/// two indexed magics.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

impl BagOfCells {
    /// Create a BoC with the given root cells.
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    /// Create a BoC with a single root cell.
    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    /// All root cells.
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// The single root cell; errors unless there is exactly one.
    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        if self.roots.len() != 1 {
            return Err(CellError::NotSingleRoot(self.roots.len()));
        }
        Ok(&self.roots[0])
    }

    /// Serialize with the CRC32-C trailer and no index.
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        self.serialize_with_options(true, false)
    }

    /// Serialize with explicit options.
    pub fn serialize_with_options(&self, with_crc: bool, with_index: bool) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("no root cells".to_string()));
        }

        let cells = self.collect_cells_root_first();
        let cell_count = cells.len();

        let hash_to_index: HashMap<[u8; 32], usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let root_indices: Vec<usize> = self
            .roots
            .iter()
            .map(|r| hash_to_index[&r.hash()])
            .collect();

        let ref_size = Self::bytes_needed(cell_count);
        let mut cell_data: Vec<Vec<u8>> = Vec::with_capacity(cell_count);
        let mut total_cells_size = 0usize;
        for cell in &cells {
            let serialized = Self::serialize_cell(cell, &hash_to_index, ref_size)?;
            total_cells_size += serialized.len();
            cell_data.push(serialized);
        }

        let size_bytes = Self::bytes_needed(cell_count);
        let off_bytes = Self::bytes_needed(total_cells_size);

        let mut result = Vec::new();
        result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

        // flags: has_idx | has_crc | has_cache_bits | 2 flag bits | size_bytes
        let flags: u8 = (if with_index { 1 << 7 } else { 0 })
            | (if with_crc { 1 << 6 } else { 0 })
            | (size_bytes as u8);
        result.push(flags);
        result.push(off_bytes as u8);

        Self::write_uint(&mut result, cell_count as u64, size_bytes);
        Self::write_uint(&mut result, self.roots.len() as u64, size_bytes);
        Self::write_uint(&mut result, 0, size_bytes); // absent cells
        Self::write_uint(&mut result, total_cells_size as u64, off_bytes);

        for idx in &root_indices {
            Self::write_uint(&mut result, *idx as u64, size_bytes);
        }

        if with_index {
            let mut offset = 0usize;
            for data in &cell_data {
                offset += data.len();
                Self::write_uint(&mut result, offset as u64, off_bytes);
            }
        }

        for data in cell_data {
            result.extend_from_slice(&data);
        }

        if with_crc {
            let crc = crc32c(&result);
            result.extend_from_slice(&crc.to_le_bytes());
        }

        Ok(result)
    }

    /// Serialize to a base64 string.
    pub fn serialize_to_base64(&self) -> CellResult<String> {
        let bytes = self.serialize()?;
        Ok(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &bytes,
        ))
    }

    /// Deserialize from bytes.
    ///
    /// Accepts the generic magic and both indexed magics.
    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        if data.len() < 5 {
            return Err(CellError::UnexpectedEof);
        }

        let mut offset = 0;
        let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        offset += 4;

        let (has_idx, has_crc, size_bytes) = match magic {
            BOC_GENERIC_MAGIC => {
                let flags = data[offset];
                offset += 1;
                ((flags & 0x80) != 0, (flags & 0x40) != 0, (flags & 0x07) as usize)
            }
            BOC_INDEXED_MAGIC => {
                let size_bytes = data[offset] as usize;
                offset += 1;
                (true, false, size_bytes)
            }
            BOC_INDEXED_CRC32_MAGIC => {
                let size_bytes = data[offset] as usize;
                offset += 1;
                (true, true, size_bytes)
            }
            _ => {
                return Err(CellError::InvalidBoc(format!(
                    "bad magic: {:08x}",
                    magic
                )));
            }
        };

        if offset >= data.len() {
            return Err(CellError::UnexpectedEof);
        }
        let off_bytes = data[offset] as usize;
        offset += 1;

        let cell_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let root_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let _absent_count = Self::read_uint(data, &mut offset, size_bytes)?;
        let total_cells_size = Self::read_uint(data, &mut offset, off_bytes)? as usize;

        let mut root_indices = Vec::with_capacity(root_count);
        for _ in 0..root_count {
            root_indices.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
        }

        if has_idx {
            offset += cell_count * off_bytes;
        }

        let data_end = if has_crc { data.len() - 4 } else { data.len() };
        if has_crc {
            if data.len() < 4 {
                return Err(CellError::UnexpectedEof);
            }
            let expected = u32::from_le_bytes([
                data[data_end],
                data[data_end + 1],
                data[data_end + 2],
                data[data_end + 3],
            ]);
            let actual = crc32c(&data[..data_end]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
        }

        if offset + total_cells_size > data_end {
            return Err(CellError::UnexpectedEof);
        }
        let cells_data = &data[offset..offset + total_cells_size];
        let cells = Self::parse_cells(cells_data, cell_count, size_bytes)?;

        let roots: Vec<Arc<Cell>> = root_indices
            .iter()
            .map(|&idx| cells.get(idx).cloned().ok_or(CellError::CellNotFound(idx)))
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    /// Deserialize from a base64 string.
    pub fn deserialize_from_base64(text: &str) -> CellResult<Self> {
        let bytes = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            text.trim(),
        )
        .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Deserialize from a hex string.
    pub fn deserialize_from_hex(text: &str) -> CellResult<Self> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| CellError::InvalidBoc(format!("bad hex: {}", e)))?;
        Self::deserialize(&bytes)
    }

    /// Collect unique cells root-first.
    ///
    /// Reverse post-order with children visited right-to-left: the result
    /// lists every parent before its children, so all reference indices
    /// point forward even when subtrees are shared.
    fn collect_cells_root_first(&self) -> Vec<Arc<Cell>> {
        let mut post_order: Vec<Arc<Cell>> = Vec::new();
        let mut visited: HashMap<[u8; 32], ()> = HashMap::new();

        for root in &self.roots {
            Self::collect_post_order(root, &mut post_order, &mut visited);
        }

        post_order.reverse();
        post_order
    }

    fn collect_post_order(
        cell: &Arc<Cell>,
        out: &mut Vec<Arc<Cell>>,
        visited: &mut HashMap<[u8; 32], ()>,
    ) {
        if visited.contains_key(&cell.hash()) {
            return;
        }
        visited.insert(cell.hash(), ());

        for reference in cell.references().iter().rev() {
            Self::collect_post_order(reference, out, visited);
        }
        out.push(cell.clone());
    }

    /// Serialize a single cell body: descriptors, padded data, ref indices.
    fn serialize_cell(
        cell: &Cell,
        hash_to_index: &HashMap<[u8; 32], usize>,
        ref_size: usize,
    ) -> CellResult<Vec<u8>> {
        let mut result = Vec::new();

        let (d1, d2) = cell.descriptors();
        result.push(d1);
        result.push(d2);
        result.extend_from_slice(&cell.data_with_completion_tag());

        for reference in cell.references() {
            let idx = hash_to_index
                .get(&reference.hash())
                .ok_or_else(|| CellError::InvalidBoc("reference not collected".to_string()))?;
            Self::write_uint(&mut result, *idx as u64, ref_size);
        }

        Ok(result)
    }

    /// Parse the cell bodies and rebuild the tree.
    fn parse_cells(
        data: &[u8],
        cell_count: usize,
        size_bytes: usize,
    ) -> CellResult<Vec<Arc<Cell>>> {
        let mut offset = 0;
        let mut raw: Vec<(Vec<u8>, usize, Vec<usize>)> = Vec::with_capacity(cell_count);

        for _ in 0..cell_count {
            if offset + 2 > data.len() {
                return Err(CellError::UnexpectedEof);
            }
            let d1 = data[offset];
            let d2 = data[offset + 1];
            offset += 2;

            if d1 & 0x08 != 0 {
                return Err(CellError::InvalidBoc(
                    "exotic cells are not supported".to_string(),
                ));
            }

            let refs_count = (d1 & 0x07) as usize;
            let data_len = (d2 as usize).div_ceil(2);
            if offset + data_len > data.len() {
                return Err(CellError::UnexpectedEof);
            }
            let cell_data = data[offset..offset + data_len].to_vec();
            offset += data_len;

            let bit_len = if d2 % 2 == 0 {
                data_len * 8
            } else {
                Self::find_bit_len(&cell_data)
            };

            let mut ref_indices = Vec::with_capacity(refs_count);
            for _ in 0..refs_count {
                ref_indices.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
            }

            raw.push((cell_data, bit_len, ref_indices));
        }

        // Detect ordering from the first cell with references: forward
        // references mean root-first (build from the back), backward
        // references mean children-first (build from the front).
        let refs_point_forward = raw
            .iter()
            .enumerate()
            .find_map(|(i, (_, _, refs))| {
                if refs.is_empty() {
                    None
                } else {
                    Some(refs.iter().all(|&r| r > i))
                }
            })
            .unwrap_or(false);

        let order: Vec<usize> = if refs_point_forward {
            (0..cell_count).rev().collect()
        } else {
            (0..cell_count).collect()
        };

        let mut cells: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
        for i in order {
            let (cell_data, bit_len, ref_indices) = &raw[i];
            let clean = Self::remove_completion_tag(cell_data, *bit_len);
            let references: Vec<Arc<Cell>> = ref_indices
                .iter()
                .map(|&idx| {
                    cells
                        .get(idx)
                        .and_then(|c| c.clone())
                        .ok_or(CellError::CellNotFound(idx))
                })
                .collect::<CellResult<Vec<_>>>()?;
            cells[i] = Some(Arc::new(Cell::new(clean, *bit_len, references)));
        }

        cells
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.ok_or(CellError::CellNotFound(i)))
            .collect()
    }

    /// Locate the completion tag: the lowest set bit of the last non-zero
    /// byte marks the end of the data.
    fn find_bit_len(data: &[u8]) -> usize {
        for i in (0..data.len()).rev() {
            let byte = data[i];
            if byte != 0 {
                let trailing_zeros = byte.trailing_zeros() as usize;
                return (i + 1) * 8 - trailing_zeros - 1;
            }
        }
        0
    }

    /// Strip the completion tag, clearing padding bits.
    fn remove_completion_tag(data: &[u8], bit_len: usize) -> Vec<u8> {
        if data.is_empty() || bit_len == 0 {
            return Vec::new();
        }

        let byte_len = bit_len.div_ceil(8);
        let mut result = data[..byte_len].to_vec();
        let remainder = bit_len % 8;
        if remainder != 0 {
            if let Some(last) = result.last_mut() {
                *last &= !((1u8 << (8 - remainder)) - 1);
            }
        }
        result
    }

    /// Bytes needed to represent `n`.
    fn bytes_needed(n: usize) -> usize {
        if n == 0 {
            1
        } else {
            ((64 - (n as u64).leading_zeros()) as usize).div_ceil(8)
        }
    }

    fn write_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
        for i in (0..bytes).rev() {
            buf.push((value >> (i * 8)) as u8);
        }
    }

    fn read_uint(data: &[u8], offset: &mut usize, bytes: usize) -> CellResult<u64> {
        if *offset + bytes > data.len() {
            return Err(CellError::UnexpectedEof);
        }
        let mut result: u64 = 0;
        for i in 0..bytes {
            result = (result << 8) | (data[*offset + i] as u64);
        }
        *offset += bytes;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    fn leaf(value: u32) -> Arc<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(value).unwrap();
        Arc::new(builder.build())
    }

    #[test]
    fn test_empty_cell_roundtrip() {
        let boc = BagOfCells::from_root(CellBuilder::new().build());
        let bytes = boc.serialize().unwrap();
        let restored = BagOfCells::deserialize(&bytes).unwrap();
        let root = restored.single_root().unwrap();
        assert_eq!(root.bit_len(), 0);
        assert_eq!(root.reference_count(), 0);
    }

    #[test]
    fn test_known_serialization() {
        // data cell {0u32, 0x01 * 32}: fixed wire bytes
        let mut builder = CellBuilder::new();
        builder.store_u32(0).unwrap();
        builder.store_bytes(&[0x01; 32]).unwrap();
        let boc = BagOfCells::from_root(builder.build());

        let expected = hex::decode(
            "b5ee9c7241010101002600004800000000010101010101010101010101010101\
             0101010101010101010101010101010101d90d28bf",
        )
        .unwrap();
        assert_eq!(boc.serialize().unwrap(), expected);
    }

    #[test]
    fn test_root_comes_first() {
        let mut parent = CellBuilder::new();
        parent.store_u32(0xCAFEBABE).unwrap();
        parent.store_ref(leaf(0x11111111)).unwrap();
        parent.store_ref(leaf(0x22222222)).unwrap();
        let root = parent.build();
        let root_hash = root.hash();

        let bytes = BagOfCells::from_root(root).serialize_with_options(false, false).unwrap();
        // envelope: magic(4) flags(1) off(1) cells(1) roots(1) absent(1)
        // tot(1) root_index(1) = 11 bytes, then the first cell descriptor
        assert_eq!(bytes[11] & 0x07, 2); // root descriptor: 2 refs
        let restored = BagOfCells::deserialize(&bytes).unwrap();
        assert_eq!(restored.single_root().unwrap().hash(), root_hash);
    }

    #[test]
    fn test_roundtrip_with_shared_subtree() {
        let shared = leaf(0xDDDDDDDD);
        let mut left = CellBuilder::new();
        left.store_u8(1).unwrap();
        left.store_ref(shared.clone()).unwrap();
        let mut right = CellBuilder::new();
        right.store_u8(2).unwrap();
        right.store_ref(shared).unwrap();

        let mut parent = CellBuilder::new();
        parent.store_ref(Arc::new(left.build())).unwrap();
        parent.store_ref(Arc::new(right.build())).unwrap();
        let root = parent.build();
        let root_hash = root.hash();

        let boc = BagOfCells::from_root(root);
        let bytes = boc.serialize().unwrap();
        let restored = BagOfCells::deserialize(&bytes).unwrap();
        assert_eq!(restored.single_root().unwrap().hash(), root_hash);
    }

    #[test]
    fn test_roundtrip_preserves_hash_at_depth_four() {
        let mut cell = CellBuilder::new().build();
        for i in 0..4u32 {
            let mut builder = CellBuilder::new();
            builder.store_u32(i).unwrap();
            builder.store_ref(Arc::new(cell)).unwrap();
            cell = builder.build();
        }
        let original_hash = cell.hash();

        let bytes = BagOfCells::from_root(cell).serialize().unwrap();
        let restored = BagOfCells::deserialize(&bytes).unwrap();
        let root = restored.single_root().unwrap();
        // the root hash covers every node, so equality proves the whole
        // chain survived
        assert_eq!(root.hash(), original_hash);
        assert_eq!(root.depth(), 4);
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let boc = BagOfCells::from_root(CellBuilder::new().build());
        let mut bytes = boc.serialize().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            BagOfCells::deserialize(&bytes),
            Err(CellError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_base64_roundtrip() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let cell = builder.build();
        let hash = cell.hash();

        let text = BagOfCells::from_root(cell).serialize_to_base64().unwrap();
        let restored = BagOfCells::deserialize_from_base64(&text).unwrap();
        assert_eq!(restored.single_root().unwrap().hash(), hash);
    }

    #[test]
    fn test_children_first_ordering_accepted() {
        // hand-built children-first BoC: leaf at 0, root at 1 with one ref
        let mut bytes = vec![];
        bytes.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());
        bytes.push(0x01); // no idx, no crc, size_bytes = 1
        bytes.push(0x01); // off_bytes
        bytes.extend_from_slice(&[2, 1, 0]); // cells, roots, absent
        bytes.push(8); // total cells size
        bytes.push(1); // root index
        bytes.extend_from_slice(&[0x00, 0x02, 0xAB]); // leaf: 8 bits
        bytes.extend_from_slice(&[0x01, 0x04, 0xCA, 0xFE, 0x00]); // root -> 0

        let restored = BagOfCells::deserialize(&bytes).unwrap();
        let root = restored.single_root().unwrap();
        assert_eq!(root.data(), &[0xCA, 0xFE]);
        assert_eq!(root.reference(0).unwrap().data(), &[0xAB]);
    }

    #[test]
    fn test_bytes_needed() {
        assert_eq!(BagOfCells::bytes_needed(0), 1);
        assert_eq!(BagOfCells::bytes_needed(255), 1);
        assert_eq!(BagOfCells::bytes_needed(256), 2);
        assert_eq!(BagOfCells::bytes_needed(65536), 3);
    }
}
