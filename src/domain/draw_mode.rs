use super::Provenance;

/// Which drawing tool is active. Exactly one mode holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Normal,
    DrawBox,
    DrawFree,
}

/// Inputs that move the draw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEvent {
    SelectBox,
    SelectFree,
    /// A draw was accepted and committed
    Finish,
    Cancel,
}

impl DrawMode {
    pub fn transition(self, event: ToolEvent) -> DrawMode {
        match event {
            ToolEvent::SelectBox => DrawMode::DrawBox,
            ToolEvent::SelectFree => DrawMode::DrawFree,
            ToolEvent::Finish | ToolEvent::Cancel => DrawMode::Normal,
        }
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self, DrawMode::Normal)
    }

    /// Vertex dragging is only available while no draw tool is active
    pub fn allows_vertex_editing(&self) -> bool {
        matches!(self, DrawMode::Normal)
    }

    /// Provenance a completed draw in this mode records
    pub fn provenance(&self) -> Option<Provenance> {
        match self {
            DrawMode::Normal => None,
            DrawMode::DrawBox => Some(Provenance::Box),
            DrawMode::DrawFree => Some(Provenance::Free),
        }
    }
}
