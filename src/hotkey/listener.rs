//! Hotkey listener thread.
//!
//! On Windows the thread owns a hidden message window with the registered
//! hotkeys and a tray icon, and pumps its message loop until the quit
//! chord or the tray "Exit" item ends it. Other platforms have no global
//! hotkey source.

use anyhow::Result;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use super::{Hotkey, HotkeyEvent};

/// Called after each event is queued so the consumer can wake up.
pub type Waker = Box<dyn Fn() + Send + Sync>;

#[cfg(windows)]
pub use win32::spawn_listener;

/// Global hotkeys need the Win32 message loop; elsewhere the launcher
/// only offers its own buttons.
#[cfg(not(windows))]
pub fn spawn_listener(
    activate: Hotkey,
    quit: Hotkey,
    tx: Sender<HotkeyEvent>,
    wake: Waker,
) -> Result<JoinHandle<()>> {
    let _ = (activate, quit, tx, wake);
    Err(anyhow::anyhow!(
        "Global hotkeys are only supported on Windows"
    ))
}

#[cfg(windows)]
mod win32 {
    use super::*;

    use anyhow::anyhow;
    use std::sync::mpsc;
    use std::sync::OnceLock;
    use std::thread;

    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
        MOD_SHIFT, MOD_WIN,
    };
    use windows::Win32::UI::Shell::{
        Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
        DispatchMessageW, GetCursorPos, GetMessageW, LoadIconW, PostQuitMessage,
        RegisterClassW, SetForegroundWindow, TrackPopupMenu, TranslateMessage, CS_HREDRAW,
        CS_VREDRAW, CW_USEDEFAULT, IDI_APPLICATION, MF_SEPARATOR, MF_STRING, MSG,
        TPM_BOTTOMALIGN, TPM_LEFTALIGN, TPM_RIGHTBUTTON, WM_COMMAND, WM_DESTROY, WM_HOTKEY,
        WM_LBUTTONDBLCLK, WM_RBUTTONUP, WM_USER, WNDCLASSW, WS_OVERLAPPEDWINDOW,
    };

    use crate::log;

    const HOTKEY_ACTIVATE: i32 = 1;
    const HOTKEY_QUIT: i32 = 2;
    const WM_TRAYICON: u32 = WM_USER + 1;

    // Menu item IDs
    const MENU_NEW_OVERLAY: usize = 1001;
    const MENU_EXIT: usize = 1002;

    /// Queues events for the launcher and wakes it.
    struct EventSink {
        tx: Sender<HotkeyEvent>,
        wake: Waker,
    }

    impl EventSink {
        fn emit(&self, event: HotkeyEvent) {
            // The launcher may already be gone during shutdown.
            if self.tx.send(event).is_ok() {
                (self.wake)();
            }
        }
    }

    /// Event sink shared with the window procedure.
    static SINK: OnceLock<EventSink> = OnceLock::new();

    fn emit(event: HotkeyEvent) {
        if let Some(sink) = SINK.get() {
            sink.emit(event);
        }
    }

    /// Starts the listener thread.
    ///
    /// Returns once both hotkeys are registered, or with the registration
    /// error. The thread sends [`HotkeyEvent::Quit`] when its loop ends.
    pub fn spawn_listener(
        activate: Hotkey,
        quit: Hotkey,
        tx: Sender<HotkeyEvent>,
        wake: Waker,
    ) -> Result<JoinHandle<()>> {
        if SINK.set(EventSink { tx, wake }).is_err() {
            return Err(anyhow!("Hotkey listener is already running"));
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                let hwnd = match setup(activate, quit) {
                    Ok(hwnd) => {
                        let _ = ready_tx.send(Ok(()));
                        hwnd
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                run_message_loop();
                teardown(hwnd);
                log("Hotkey listener stopped");
                emit(HotkeyEvent::Quit);
            })?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("Hotkey listener exited during startup"))??;
        Ok(handle)
    }

    /// Creates the message window, registers both hotkeys and adds the tray icon.
    fn setup(activate: Hotkey, quit: Hotkey) -> Result<HWND> {
        let hwnd = create_message_window()?;

        if let Err(e) = register(hwnd, HOTKEY_ACTIVATE, activate) {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            return Err(e);
        }
        if let Err(e) = register(hwnd, HOTKEY_QUIT, quit) {
            unsafe {
                let _ = UnregisterHotKey(hwnd, HOTKEY_ACTIVATE);
                let _ = DestroyWindow(hwnd);
            }
            return Err(e);
        }

        // The hotkeys work without the tray icon.
        if let Err(e) = add_tray_icon(hwnd, activate) {
            log(&format!("Warning: {}", e));
        }

        log(&format!("Hotkey: {} (new overlay)", activate));
        log(&format!("Hotkey: {} (quit)", quit));
        Ok(hwnd)
    }

    fn modifier_flags(hotkey: Hotkey) -> HOT_KEY_MODIFIERS {
        let m = hotkey.modifiers;
        let mut flags = MOD_NOREPEAT;
        if m.ctrl {
            flags = flags | MOD_CONTROL;
        }
        if m.alt {
            flags = flags | MOD_ALT;
        }
        if m.shift {
            flags = flags | MOD_SHIFT;
        }
        if m.win {
            flags = flags | MOD_WIN;
        }
        flags
    }

    fn register(hwnd: HWND, id: i32, hotkey: Hotkey) -> Result<()> {
        unsafe {
            RegisterHotKey(hwnd, id, modifier_flags(hotkey), hotkey.virtual_key())
                .map_err(|e| anyhow!("Failed to register hotkey {}: {}", hotkey, e))
        }
    }

    fn run_message_loop() {
        let mut msg = MSG::default();
        unsafe {
            while GetMessageW(&mut msg, HWND::default(), 0, 0).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn teardown(hwnd: HWND) {
        unsafe {
            let _ = UnregisterHotKey(hwnd, HOTKEY_ACTIVATE);
            let _ = UnregisterHotKey(hwnd, HOTKEY_QUIT);
            remove_tray_icon(hwnd);
            let _ = DestroyWindow(hwnd);
        }
    }

    fn create_message_window() -> Result<HWND> {
        unsafe {
            let hinstance = GetModuleHandleW(None)?;
            let class_name = w!("OverlayRulerHotkeyClass");

            let wc = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                lpszClassName: class_name,
                ..Default::default()
            };

            let atom = RegisterClassW(&wc);
            if atom == 0 {
                return Err(anyhow!("Failed to register window class"));
            }

            let hwnd = CreateWindowExW(
                Default::default(),
                class_name,
                w!("Overlay Ruler"),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                hinstance,
                None,
            )?;

            Ok(hwnd)
        }
    }

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        unsafe {
            match msg {
                WM_HOTKEY => {
                    let hotkey_id = wparam.0 as i32;
                    if hotkey_id == HOTKEY_ACTIVATE {
                        log("Activate hotkey pressed");
                        emit(HotkeyEvent::Activate);
                    } else if hotkey_id == HOTKEY_QUIT {
                        log("Quit hotkey pressed");
                        PostQuitMessage(0);
                    }
                    LRESULT(0)
                }
                WM_TRAYICON => {
                    let event = (lparam.0 & 0xFFFF) as u32;
                    match event {
                        WM_RBUTTONUP => show_context_menu(hwnd),
                        WM_LBUTTONDBLCLK => emit(HotkeyEvent::Activate),
                        _ => {}
                    }
                    LRESULT(0)
                }
                WM_COMMAND => {
                    let cmd = wparam.0 & 0xFFFF;
                    if cmd == MENU_NEW_OVERLAY {
                        log("New overlay requested from tray");
                        emit(HotkeyEvent::Activate);
                    } else if cmd == MENU_EXIT {
                        log("Exit requested from tray");
                        PostQuitMessage(0);
                    }
                    LRESULT(0)
                }
                WM_DESTROY => {
                    PostQuitMessage(0);
                    LRESULT(0)
                }
                _ => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }
    }

    fn add_tray_icon(hwnd: HWND, activate: Hotkey) -> Result<()> {
        unsafe {
            let mut nid = NOTIFYICONDATAW {
                cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
                hWnd: hwnd,
                uID: 1,
                uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP,
                uCallbackMessage: WM_TRAYICON,
                hIcon: LoadIconW(None, IDI_APPLICATION)?,
                ..Default::default()
            };

            let tip = format!("Overlay Ruler: {} to measure, right-click for menu", activate);
            let tip_wide: Vec<u16> = tip.encode_utf16().chain(std::iter::once(0)).collect();
            let len = tip_wide.len().min(nid.szTip.len());
            nid.szTip[..len].copy_from_slice(&tip_wide[..len]);

            if !Shell_NotifyIconW(NIM_ADD, &nid).as_bool() {
                return Err(anyhow!("Failed to add tray icon"));
            }

            Ok(())
        }
    }

    fn remove_tray_icon(hwnd: HWND) {
        unsafe {
            let nid = NOTIFYICONDATAW {
                cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
                hWnd: hwnd,
                uID: 1,
                ..Default::default()
            };
            let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
        }
    }

    fn show_context_menu(hwnd: HWND) {
        unsafe {
            let menu = match CreatePopupMenu() {
                Ok(menu) => menu,
                Err(e) => {
                    log(&format!("Failed to create tray menu: {}", e));
                    return;
                }
            };

            let items = [
                (MF_STRING, MENU_NEW_OVERLAY, w!("New Overlay")),
                (MF_SEPARATOR, 0, PCWSTR::null()),
                (MF_STRING, MENU_EXIT, w!("Exit")),
            ];
            for (flags, id, label) in items {
                let _ = AppendMenuW(menu, flags, id, label);
            }

            let mut pt = POINT::default();
            let _ = GetCursorPos(&mut pt);

            // Without foreground the menu stays open after focus leaves it.
            let _ = SetForegroundWindow(hwnd);

            let _ = TrackPopupMenu(
                menu,
                TPM_BOTTOMALIGN | TPM_LEFTALIGN | TPM_RIGHTBUTTON,
                pt.x,
                pt.y,
                0,
                hwnd,
                None,
            );

            let _ = DestroyMenu(menu);
        }
    }
}
