use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ==========================================
// OverflowEntry - 队列项
// ==========================================
// 排序: 溢出分钟数升序 → 坩埚ID升序 → 入队序号升序
#[derive(Debug, Clone)]
pub struct OverflowEntry {
    pub overflow_min: f64, // 距模拟开始的溢出分钟数
    pub vessel_id: String,
    seq: u64,
}

impl Ord for OverflowEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap 是最大堆，整体反转得到最早溢出优先
        other
            .overflow_min
            .total_cmp(&self.overflow_min)
            .then_with(|| other.vessel_id.cmp(&self.vessel_id))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OverflowEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for OverflowEntry {}

impl PartialEq for OverflowEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// ==========================================
// OverflowQueue - 溢出时间最小优先队列
// ==========================================
#[derive(Debug, Default)]
pub struct OverflowQueue {
    heap: BinaryHeap<OverflowEntry>,
    next_seq: u64,
}

impl OverflowQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overflow_min: f64, vessel_id: &str) {
        self.heap.push(OverflowEntry {
            overflow_min,
            vessel_id: vessel_id.to_string(),
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<OverflowEntry> {
        self.heap.pop()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// 队列中剩余的坩埚（去重、排序）
    #[cfg(test)]
    pub(crate) fn pending_vessels(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.heap.iter().map(|e| e.vessel_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
