//! Ready queues. Round-robin is an intrusive circular doubly-linked ring
//! built on the TCB's own `next`/`prev` index links; priority is a
//! fixed-capacity array-backed min-heap keyed on `(priority, pid)`, pid
//! breaking ties in favour of the older task. Exactly one is active at a
//! time, selected by [`Policy`].

use crate::config::MAX_TASKS;
use crate::task::tcb::Tcb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    RoundRobin,
    Priority,
}

/// Circular doubly-linked ring of task indices, O(1) enqueue/dequeue/removal.
pub struct RoundRobinQueue {
    head: Option<usize>,
    len: usize,
}

impl RoundRobinQueue {
    pub const fn new() -> Self {
        RoundRobinQueue { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links `index` in just before the head, i.e. at the tail. `index`
    /// must not already be queued.
    pub fn enqueue(&mut self, tasks: &mut [Tcb; MAX_TASKS], index: usize) {
        match self.head {
            None => {
                tasks[index].next = Some(index);
                tasks[index].prev = Some(index);
                self.head = Some(index);
            }
            Some(head) => {
                let tail = tasks[head].prev.expect("ring head always has a prev");
                tasks[tail].next = Some(index);
                tasks[index].prev = Some(tail);
                tasks[index].next = Some(head);
                tasks[head].prev = Some(index);
            }
        }
        self.len += 1;
    }

    /// Unlinks and returns the head.
    pub fn dequeue(&mut self, tasks: &mut [Tcb; MAX_TASKS]) -> Option<usize> {
        let head = self.head?;
        self.remove(tasks, head);
        Some(head)
    }

    /// Unlinks `index` from wherever it sits in the ring. A no-op if
    /// `index`'s links are already clear (not currently queued).
    pub fn remove(&mut self, tasks: &mut [Tcb; MAX_TASKS], index: usize) {
        let (next, prev) = match (tasks[index].next, tasks[index].prev) {
            (Some(n), Some(p)) => (n, p),
            _ => return,
        };
        if next == index {
            self.head = None;
        } else {
            tasks[prev].next = Some(next);
            tasks[next].prev = Some(prev);
            if self.head == Some(index) {
                self.head = Some(next);
            }
        }
        tasks[index].next = None;
        tasks[index].prev = None;
        self.len = self.len.saturating_sub(1);
    }
}

/// Fixed-capacity array-backed binary min-heap over task indices, keyed on
/// `(priority, pid)`.
pub struct PriorityHeap {
    data: [usize; MAX_TASKS],
    len: usize,
}

impl PriorityHeap {
    pub const fn new() -> Self {
        PriorityHeap { data: [0; MAX_TASKS], len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn key(tasks: &[Tcb; MAX_TASKS], index: usize) -> (u8, u32) {
        (tasks[index].priority, tasks[index].pid)
    }

    fn less(tasks: &[Tcb; MAX_TASKS], a: usize, b: usize) -> bool {
        Self::key(tasks, a) < Self::key(tasks, b)
    }

    fn sift_up(&mut self, tasks: &[Tcb; MAX_TASKS], mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if Self::less(tasks, self.data[i], self.data[parent]) {
                self.data.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, tasks: &[Tcb; MAX_TASKS], mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < self.len && Self::less(tasks, self.data[left], self.data[smallest]) {
                smallest = left;
            }
            if right < self.len && Self::less(tasks, self.data[right], self.data[smallest]) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.data.swap(i, smallest);
            i = smallest;
        }
    }

    /// O(log n). Silently drops the insert if the heap is already at
    /// `MAX_TASKS` capacity — cannot happen in practice since the heap
    /// never holds more entries than the task table has slots.
    pub fn insert(&mut self, tasks: &[Tcb; MAX_TASKS], index: usize) {
        if self.len >= MAX_TASKS {
            return;
        }
        self.data[self.len] = index;
        self.len += 1;
        self.sift_up(tasks, self.len - 1);
    }

    /// O(log n).
    pub fn extract_min(&mut self, tasks: &[Tcb; MAX_TASKS]) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let min = self.data[0];
        self.len -= 1;
        self.data[0] = self.data[self.len];
        self.sift_down(tasks, 0);
        Some(min)
    }

    /// O(n) search, O(log n) re-heapify. Used to pull a Ready task out of
    /// the heap before it blocks or sleeps.
    pub fn remove(&mut self, tasks: &[Tcb; MAX_TASKS], index: usize) {
        let Some(pos) = self.data[..self.len].iter().position(|&x| x == index) else {
            return;
        };
        self.len -= 1;
        self.data[pos] = self.data[self.len];
        if pos < self.len {
            self.sift_down(tasks, pos);
            self.sift_up(tasks, pos);
        }
    }

    /// Re-heapifies around `index` after its priority changed in place.
    pub fn reheapify(&mut self, tasks: &[Tcb; MAX_TASKS], index: usize) {
        let Some(pos) = self.data[..self.len].iter().position(|&x| x == index) else {
            return;
        };
        self.sift_up(tasks, pos);
        self.sift_down(tasks, pos);
    }
}

/// Both backing structures, with the active one selected by `policy`.
/// Switching `policy` does not migrate already-queued tasks between the two
/// structures — tasks already queued stay where they are until
/// re-enqueued, becoming reachable again only once dequeued and
/// re-enqueued under whichever policy is active at that time.
pub struct ReadyQueues {
    pub policy: Policy,
    pub round_robin: RoundRobinQueue,
    pub priority: PriorityHeap,
}

impl ReadyQueues {
    pub const fn new() -> Self {
        ReadyQueues { policy: Policy::RoundRobin, round_robin: RoundRobinQueue::new(), priority: PriorityHeap::new() }
    }

    pub fn enqueue(&mut self, tasks: &mut [Tcb; MAX_TASKS], index: usize) {
        match self.policy {
            Policy::RoundRobin => self.round_robin.enqueue(tasks, index),
            Policy::Priority => self.priority.insert(tasks, index),
        }
    }

    pub fn dequeue(&mut self, tasks: &mut [Tcb; MAX_TASKS]) -> Option<usize> {
        match self.policy {
            Policy::RoundRobin => self.round_robin.dequeue(tasks),
            Policy::Priority => self.priority.extract_min(tasks),
        }
    }

    pub fn remove(&mut self, tasks: &mut [Tcb; MAX_TASKS], index: usize) {
        match self.policy {
            Policy::RoundRobin => self.round_robin.remove(tasks, index),
            Policy::Priority => self.priority.remove(tasks, index),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.policy {
            Policy::RoundRobin => self.round_robin.is_empty(),
            Policy::Priority => self.priority.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table() -> [Tcb; MAX_TASKS] {
        [Tcb::unused(); MAX_TASKS]
    }

    fn set(tasks: &mut [Tcb; MAX_TASKS], index: usize, priority: u8, pid: u32) {
        tasks[index].priority = priority;
        tasks[index].pid = pid;
        tasks[index].state = crate::task::tcb::TaskState::Ready;
    }

    #[test]
    fn round_robin_is_fifo() {
        let mut tasks = make_table();
        set(&mut tasks, 0, 0, 1);
        set(&mut tasks, 1, 0, 2);
        set(&mut tasks, 2, 0, 3);
        let mut q = RoundRobinQueue::new();
        q.enqueue(&mut tasks, 0);
        q.enqueue(&mut tasks, 1);
        q.enqueue(&mut tasks, 2);
        assert_eq!(q.dequeue(&mut tasks), Some(0));
        assert_eq!(q.dequeue(&mut tasks), Some(1));
        assert_eq!(q.dequeue(&mut tasks), Some(2));
        assert_eq!(q.dequeue(&mut tasks), None);
    }

    #[test]
    fn round_robin_remove_by_index_mid_ring() {
        let mut tasks = make_table();
        set(&mut tasks, 0, 0, 1);
        set(&mut tasks, 1, 0, 2);
        set(&mut tasks, 2, 0, 3);
        let mut q = RoundRobinQueue::new();
        q.enqueue(&mut tasks, 0);
        q.enqueue(&mut tasks, 1);
        q.enqueue(&mut tasks, 2);
        q.remove(&mut tasks, 1);
        assert_eq!(q.len(), 2);
        assert_eq!(q.dequeue(&mut tasks), Some(0));
        assert_eq!(q.dequeue(&mut tasks), Some(2));
    }

    #[test]
    fn priority_heap_extracts_lowest_priority_first() {
        let mut tasks = make_table();
        set(&mut tasks, 0, 5, 1);
        set(&mut tasks, 1, 1, 2);
        set(&mut tasks, 2, 3, 3);
        let mut heap = PriorityHeap::new();
        heap.insert(&tasks, 0);
        heap.insert(&tasks, 1);
        heap.insert(&tasks, 2);
        assert_eq!(heap.extract_min(&tasks), Some(1));
        assert_eq!(heap.extract_min(&tasks), Some(2));
        assert_eq!(heap.extract_min(&tasks), Some(0));
    }

    #[test]
    fn priority_heap_ties_broken_by_pid() {
        let mut tasks = make_table();
        set(&mut tasks, 0, 2, 10);
        set(&mut tasks, 1, 2, 5);
        let mut heap = PriorityHeap::new();
        heap.insert(&tasks, 0);
        heap.insert(&tasks, 1);
        assert_eq!(heap.extract_min(&tasks), Some(1));
        assert_eq!(heap.extract_min(&tasks), Some(0));
    }

    #[test]
    fn priority_heap_remove_mid_heap() {
        let mut tasks = make_table();
        set(&mut tasks, 0, 4, 1);
        set(&mut tasks, 1, 2, 2);
        set(&mut tasks, 2, 6, 3);
        set(&mut tasks, 3, 1, 4);
        let mut heap = PriorityHeap::new();
        for i in 0..4 {
            heap.insert(&tasks, i);
        }
        heap.remove(&tasks, 1);
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.extract_min(&tasks), Some(3));
        assert_eq!(heap.extract_min(&tasks), Some(0));
        assert_eq!(heap.extract_min(&tasks), Some(2));
    }
}
