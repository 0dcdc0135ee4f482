//! Style bits and flag sets.

use bitflags::bitflags;

bitflags! {
    /// Window style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Style: u32 {
        const POPUP = 0x8000_0000;
        const CHILD = 0x4000_0000;
        const MINIMIZE = 0x2000_0000;
        const VISIBLE = 0x1000_0000;
        const DISABLED = 0x0800_0000;
        const MAXIMIZE = 0x0100_0000;
        const CAPTION = 0x00C0_0000;
        const BORDER = 0x0080_0000;
        const DLGFRAME = 0x0040_0000;
        const THICKFRAME = 0x0004_0000;
    }
}

bitflags! {
    /// Extended window style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExStyle: u32 {
        const DLGMODALFRAME = 0x0000_0001;
        const TRANSPARENT = 0x0000_0020;
        const MDICHILD = 0x0000_0040;
        const LAYERED = 0x0008_0000;
        /// Position is owned by an external window manager.
        const MANAGED = 0x4000_0000;
    }
}

bitflags! {
    /// Internal per-window state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// Size/move notifications are owed on the next show.
        const NEED_SIZE = 0x0001;
    }
}

bitflags! {
    /// Flags accepted by `set_window_pos` and the deferred batch API.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SwpFlags: u32 {
        const NOSIZE = 0x0001;
        const NOMOVE = 0x0002;
        const NOZORDER = 0x0004;
        const NOREDRAW = 0x0008;
        const NOACTIVATE = 0x0010;
        const FRAMECHANGED = 0x0020;
        const SHOWWINDOW = 0x0040;
        const HIDEWINDOW = 0x0080;
        const NOCOPYBITS = 0x0100;
        const NOOWNERZORDER = 0x0200;
    }
}

bitflags! {
    /// Filters for `child_window_from_point_ex`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChildSkip: u32 {
        const INVISIBLE = 0x0001;
        const DISABLED = 0x0002;
        const TRANSPARENT = 0x0004;
    }
}

impl Style {
    /// A child window that is not also a popup.
    pub fn is_child(self) -> bool {
        self & (Style::CHILD | Style::POPUP) == Style::CHILD
    }

    pub(crate) fn has_thick_frame(self) -> bool {
        self.contains(Style::THICKFRAME) && (self & (Style::DLGFRAME | Style::BORDER)) != Style::DLGFRAME
    }
}

pub(crate) fn has_dlg_frame(style: Style, ex_style: ExStyle) -> bool {
    ex_style.contains(ExStyle::DLGMODALFRAME)
        || (style.contains(Style::DLGFRAME) && !style.contains(Style::BORDER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_is_border_plus_dlgframe() {
        assert_eq!(Style::CAPTION, Style::BORDER | Style::DLGFRAME);
    }

    #[test]
    fn test_frame_predicates() {
        assert!(Style::THICKFRAME.has_thick_frame());
        assert!(!(Style::THICKFRAME | Style::DLGFRAME).has_thick_frame());
        assert!(has_dlg_frame(Style::DLGFRAME, ExStyle::empty()));
        assert!(!has_dlg_frame(Style::CAPTION, ExStyle::empty()));
        assert!(has_dlg_frame(Style::empty(), ExStyle::DLGMODALFRAME));
        assert!((Style::CHILD | Style::VISIBLE).is_child());
        assert!(!(Style::CHILD | Style::POPUP).is_child());
    }
}
