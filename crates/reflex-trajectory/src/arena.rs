//! Scratch Arena - 区域式分配器
//!
//! 轨迹的所有临时缓冲区都从 arena 中切分，轨迹本身从不单独释放内存。
//!
//! # 生命周期
//!
//! ```text
//! ScratchArena (调用者持有)
//!   └── Region<'a>   (arena.region() 借出，作用域内有效)
//!         ├── &'a mut [f64]  (TrapezoidalProfile 的缓冲区)
//!         └── &'a mut [f64]  (...)
//! ```
//!
//! - 构造轨迹时一次性分配，查询路径上不再分配
//! - 丢弃轨迹和 `Region` 后，arena 可以再次借出（相当于整体释放）
//! - 借用检查器保证：轨迹存活期间 arena 不可能被重置
//!
//! # 示例
//!
//! ```rust
//! use reflex_trajectory::{ScratchArena, TrapezoidalProfile};
//!
//! let mut arena = ScratchArena::with_capacity(TrapezoidalProfile::required_capacity(6));
//! {
//!     let mut region = arena.region();
//!     let profile = TrapezoidalProfile::new(&mut region, 6).unwrap();
//!     assert_eq!(region.remaining(), 0);
//!     # drop(profile);
//! }
//! // 轨迹已丢弃，整块内存可复用
//! let capacity = arena.capacity();
//! assert_eq!(arena.region().remaining(), capacity);
//! ```

use crate::error::{Result, TrajectoryError};

/// 区域式分配器的后备存储
///
/// 在控制循环启动前创建，容量固定。
#[derive(Debug)]
pub struct ScratchArena {
    storage: Vec<f64>,
}

impl ScratchArena {
    /// 创建容量为 `capacity` 个 f64 的 arena
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0.0; capacity],
        }
    }

    /// 容量（f64 个数）
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// 借出一个分配区域
    ///
    /// 区域内分配的所有缓冲区与该借用同生命周期；区域结束即整体释放。
    pub fn region(&mut self) -> Region<'_> {
        Region {
            free: &mut self.storage[..],
        }
    }
}

/// Arena 中的一个分配区域（bump 分配）
#[derive(Debug)]
pub struct Region<'a> {
    free: &'a mut [f64],
}

impl<'a> Region<'a> {
    /// 分配 `len` 个 f64，初始化为 0
    ///
    /// # 错误
    ///
    /// 剩余空间不足时返回 [`TrajectoryError::ArenaExhausted`]，不会 panic。
    pub fn alloc(&mut self, len: usize) -> Result<&'a mut [f64]> {
        if len > self.free.len() {
            return Err(TrajectoryError::ArenaExhausted {
                requested: len,
                available: self.free.len(),
            });
        }

        let free = std::mem::take(&mut self.free);
        let (head, tail) = free.split_at_mut(len);
        self.free = tail;
        head.fill(0.0);
        Ok(head)
    }

    /// 分配并以 `value` 填充
    pub fn alloc_filled(&mut self, len: usize, value: f64) -> Result<&'a mut [f64]> {
        let buf = self.alloc(len)?;
        buf.fill(value);
        Ok(buf)
    }

    /// 剩余可分配的 f64 个数
    pub fn remaining(&self) -> usize {
        self.free.len()
    }
}
