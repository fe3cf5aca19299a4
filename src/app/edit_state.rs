// ==========================================
// DCP 追踪系统 - 界面编辑状态
// ==========================================
// 职责: 列表页的 编辑 / 删除确认 状态机，随调用方传递
// 转换:
//   Idle --begin_edit--> Editing(id)
//   Idle --request_delete--> ConfirmingDelete(id)
//   Editing / ConfirmingDelete --finish/cancel--> Idle
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditState {
    #[default]
    Idle,
    Editing(i64),
    ConfirmingDelete(i64),
}

/// 界面页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Dashboard,
    Lots,
    QualityControl,
    Packaging,
    Shipments,
    Agencies,
    Couriers,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditTransitionError {
    #[error("当前状态 {from:?} 不允许 {action}")]
    NotAllowed { from: EditState, action: &'static str },
}

/// 界面状态（页面 + 编辑状态）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub screen: Screen,
    pub edit: EditState,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换页面；未完成的编辑被丢弃
    pub fn navigate(&mut self, screen: Screen) {
        if self.edit != EditState::Idle {
            tracing::debug!(from = ?self.edit, "切换页面，放弃未完成的编辑");
        }
        self.screen = screen;
        self.edit = EditState::Idle;
    }

    pub fn begin_edit(&mut self, id: i64) -> Result<(), EditTransitionError> {
        self.transition_from_idle(EditState::Editing(id), "begin_edit")
    }

    pub fn request_delete(&mut self, id: i64) -> Result<(), EditTransitionError> {
        self.transition_from_idle(EditState::ConfirmingDelete(id), "request_delete")
    }

    /// 确认删除，返回待删除的ID
    pub fn confirm_delete(&mut self) -> Result<i64, EditTransitionError> {
        match self.edit {
            EditState::ConfirmingDelete(id) => {
                self.edit = EditState::Idle;
                Ok(id)
            }
            from => Err(EditTransitionError::NotAllowed {
                from,
                action: "confirm_delete",
            }),
        }
    }

    /// 保存编辑，返回被编辑的ID
    pub fn finish_edit(&mut self) -> Result<i64, EditTransitionError> {
        match self.edit {
            EditState::Editing(id) => {
                self.edit = EditState::Idle;
                Ok(id)
            }
            from => Err(EditTransitionError::NotAllowed {
                from,
                action: "finish_edit",
            }),
        }
    }

    pub fn cancel(&mut self) {
        self.edit = EditState::Idle;
    }

    fn transition_from_idle(
        &mut self,
        next: EditState,
        action: &'static str,
    ) -> Result<(), EditTransitionError> {
        if self.edit != EditState::Idle {
            return Err(EditTransitionError::NotAllowed {
                from: self.edit,
                action,
            });
        }
        self.edit = next;
        Ok(())
    }
}
