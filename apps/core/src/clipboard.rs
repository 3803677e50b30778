use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Text access to the OS clipboard.
pub trait ClipboardAccess: Send + Sync {
    /// `Ok(None)` when the clipboard holds no text.
    fn read_text(&self) -> Result<Option<String>, ClipboardError>;

    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(target_os = "windows")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        use windows_sys::Win32::System::DataExchange::{
            CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
        };
        use windows_sys::Win32::System::Memory::{GlobalLock, GlobalUnlock};

        unsafe {
            if OpenClipboard(std::ptr::null_mut()) == 0 {
                return Err(ClipboardError::Unavailable(
                    "clipboard is held by another process".to_string(),
                ));
            }

            if IsClipboardFormatAvailable(CF_UNICODETEXT) == 0 {
                CloseClipboard();
                return Ok(None);
            }

            let handle = GetClipboardData(CF_UNICODETEXT);
            if handle.is_null() {
                CloseClipboard();
                return Ok(None);
            }

            let ptr = GlobalLock(handle) as *const u16;
            if ptr.is_null() {
                CloseClipboard();
                return Ok(None);
            }

            let mut len = 0usize;
            while *ptr.add(len) != 0 {
                len += 1;
            }
            let text = String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len));

            GlobalUnlock(handle);
            CloseClipboard();
            Ok(Some(text))
        }
    }

    fn write_text(&self, value: &str) -> Result<(), ClipboardError> {
        use windows_sys::Win32::System::DataExchange::{
            CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
        };
        use windows_sys::Win32::System::Memory::{
            GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, GMEM_MOVEABLE,
        };

        let wide: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
        let bytes = wide.len() * std::mem::size_of::<u16>();
        let fail = |message: &str| Err(ClipboardError::Write(message.to_string()));
        unsafe {
            if OpenClipboard(std::ptr::null_mut()) == 0 {
                return fail("failed to open clipboard");
            }
            if EmptyClipboard() == 0 {
                CloseClipboard();
                return fail("failed to clear clipboard");
            }

            let mem = GlobalAlloc(GMEM_MOVEABLE, bytes);
            if mem.is_null() {
                CloseClipboard();
                return fail("failed to allocate clipboard memory");
            }

            let ptr = GlobalLock(mem) as *mut u16;
            if ptr.is_null() {
                GlobalFree(mem);
                CloseClipboard();
                return fail("failed to lock clipboard memory");
            }
            std::ptr::copy_nonoverlapping(wide.as_ptr(), ptr, wide.len());
            GlobalUnlock(mem);

            if SetClipboardData(CF_UNICODETEXT, mem).is_null() {
                GlobalFree(mem);
                CloseClipboard();
                return fail("failed to set clipboard data");
            }

            CloseClipboard();
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
const CF_UNICODETEXT: u32 = 13;

/// On X11/Wayland one `arboard` handle is kept alive so written selections
/// survive after the write returns.
#[cfg(not(target_os = "windows"))]
#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(not(target_os = "macos"))]
    handle: parking_lot::Mutex<Option<arboard::Clipboard>>,
}

#[cfg(not(target_os = "windows"))]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_handle<T>(
        &self,
        op: impl FnOnce(&mut arboard::Clipboard) -> Result<T, ClipboardError>,
    ) -> Result<T, ClipboardError> {
        #[cfg(target_os = "macos")]
        {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            op(&mut clipboard)
        }

        #[cfg(not(target_os = "macos"))]
        {
            self.with_shared_handle(op)
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn with_shared_handle<T>(
        &self,
        op: impl FnOnce(&mut arboard::Clipboard) -> Result<T, ClipboardError>,
    ) -> Result<T, ClipboardError> {
        let mut guard = self.handle.lock();
        if guard.is_none() {
            let created = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            *guard = Some(created);
        }
        match guard.as_mut() {
            Some(clipboard) => op(clipboard),
            None => Err(ClipboardError::Unavailable("no clipboard handle".to_string())),
        }
    }
}

#[cfg(not(target_os = "windows"))]
impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        self.with_handle(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(error) => Err(ClipboardError::Unavailable(error.to_string())),
        })
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.with_handle(|clipboard| {
            clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError::Write(e.to_string()))
        })
    }
}
