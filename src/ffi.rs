//! C ABI bindings for registering this crate's filters with a host FTS5
//! engine.
//!
//! Mirrors SQLite's own tokenizer ABI directly: a tokenizer is a vtable of
//! three function pointers (`xCreate`, `xDelete`, `xTokenize`), and a host
//! registers one by calling `fts5_api.xCreateTokenizer`. `xTokenize` hands
//! the tokenizer a C callback (`xToken`) rather than returning a buffer; this
//! module is the adapter between that push-style C callback and this crate's
//! push-style [`Emit`] trait, so no buffering or format conversion happens at
//! the boundary in either direction.
//!
//! # Ownership Rules
//!
//! - `fts5_tokenizer.xCreate`'s output pointer: **caller (host) owns**, must
//!   be passed to the matching `xDelete` exactly once.
//! - `azArg` strings passed into `xCreate`: **caller retains ownership**,
//!   valid only for the duration of the call — this module copies anything
//!   it needs (parent name, stemmer languages) out of them before returning.
//! - The shared dictionary connection opened by the first `sqlite3_*_init`
//!   call to run is never closed while the process is loaded; SQLite itself
//!   owns the underlying `db` handle for the process lifetime, so treating it
//!   as `'static` here does not leak anything the host wasn't already going
//!   to hold open.
//!
//! # Safety
//!
//! Every `extern "C"` function in this module is `unsafe`: all of them
//! dereference host-supplied pointers that cannot be validated at the Rust
//! type level. Each documents the specific preconditions the host ABI
//! guarantees it relies on.

#![allow(non_snake_case, non_camel_case_types)] // names mirror the C ABI's own casing verbatim

use std::ffi::CStr;
use std::ptr;
use std::sync::{Arc, OnceLock};

use libc::{c_char, c_int, c_void};
use parking_lot::Mutex;
use rusqlite::Connection;

use crate::config::{self, ParentRef};
use crate::context::SharedContext;
use crate::dictionaries::{phrases, stopwords, synonyms};
use crate::errors::{TokenizerError, TokenizerResult};
use crate::filter::{Emit, TokenSource};
use crate::filters::phrase::PhraseFilter;
use crate::filters::stemmer::StemmerFilter;
use crate::filters::stopwords::StopwordFilter;
use crate::filters::synonym::SynonymFilter;
use crate::splitter::UnicodeWordSplitter;
use crate::token::{Token, TokenFlags, TokenizeFlags};

const SQLITE_OK: c_int = 0;
const SQLITE_ERROR: c_int = 1;
const SQLITE_NOMEM: c_int = 7;

/// Opaque tokenizer instance handed back and forth across the C boundary.
/// Each live one is really a leaked, singly-owned `Box<DynSource>` reinterpreted
/// through this marker type.
#[repr(C)]
pub struct Fts5Tokenizer {
    _private: [u8; 0],
}

/// Callback the host passes into `xTokenize`, invoked once per token.
pub type Fts5XToken = unsafe extern "C" fn(
    p_ctx: *mut c_void,
    tflags: c_int,
    token: *const c_char,
    n_token: c_int,
    i_start: c_int,
    i_end: c_int,
) -> c_int;

/// The tokenizer vtable a `fts5_api.xCreateTokenizer` registration supplies.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct fts5_tokenizer {
    pub xCreate: unsafe extern "C" fn(
        p_ctx: *mut c_void,
        az_arg: *mut *const c_char,
        n_arg: c_int,
        pp_out: *mut *mut Fts5Tokenizer,
    ) -> c_int,
    pub xDelete: unsafe extern "C" fn(*mut Fts5Tokenizer),
    pub xTokenize: unsafe extern "C" fn(
        *mut Fts5Tokenizer,
        *mut c_void,
        c_int,
        *const c_char,
        c_int,
        Fts5XToken,
    ) -> c_int,
}

/// The subset of the host's `fts5_api` this module needs: registering new
/// tokenizers and resolving ones already registered (`unicode61`, `ascii`,
/// or another filter from this same crate further down the chain).
#[repr(C)]
pub struct fts5_api {
    pub iVersion: c_int,
    pub xCreateTokenizer: unsafe extern "C" fn(
        p_api: *mut fts5_api,
        z_name: *const c_char,
        p_context: *mut c_void,
        p_tokenizer: *const fts5_tokenizer,
        x_destroy: Option<unsafe extern "C" fn(*mut c_void)>,
    ) -> c_int,
    pub xFindTokenizer: unsafe extern "C" fn(
        p_api: *mut fts5_api,
        z_name: *const c_char,
        pp_context: *mut *mut c_void,
        p_tokenizer: *mut fts5_tokenizer,
    ) -> c_int,
}

type DynSource = Box<dyn TokenSource + Send>;

/// The shared dictionary connection, opened once by whichever `_init`
/// function the host calls first.
static SHARED_DB: OnceLock<Arc<Mutex<Connection>>> = OnceLock::new();

fn shared_db() -> Arc<Mutex<Connection>> {
    SHARED_DB
        .get_or_init(|| {
            let conn = Connection::open_in_memory().expect("opening the dictionary store failed");
            Arc::new(Mutex::new(conn))
        })
        .clone()
}

fn result_to_rc(result: TokenizerResult<()>) -> c_int {
    match result {
        Ok(()) => SQLITE_OK,
        Err(TokenizerError::Nomem) => SQLITE_NOMEM,
        Err(_) => SQLITE_ERROR,
    }
}

unsafe fn read_args(az_arg: *mut *const c_char, n_arg: c_int) -> Vec<String> {
    if az_arg.is_null() || n_arg <= 0 {
        return Vec::new();
    }
    (0..n_arg as isize)
        .map(|i| {
            let ptr = unsafe { *az_arg.offset(i) };
            unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
        })
        .collect()
}

/// Adapts a parent tokenizer reached through the raw C vtable into a
/// [`TokenSource`], so a filter built in this module can chain onto any
/// tokenizer the host knows about — including `unicode61` and tokenizers
/// registered by an earlier call into this same module.
struct HostParent {
    tokenizer: fts5_tokenizer,
    instance: *mut Fts5Tokenizer,
}

unsafe impl Send for HostParent {}

impl Drop for HostParent {
    fn drop(&mut self) {
        unsafe { (self.tokenizer.xDelete)(self.instance) }
    }
}

struct TrampolineCtx<'a> {
    emit: &'a mut dyn Emit,
    err: Option<TokenizerError>,
}

unsafe extern "C" fn emit_trampoline(
    p_ctx: *mut c_void,
    tflags: c_int,
    token: *const c_char,
    n_token: c_int,
    i_start: c_int,
    i_end: c_int,
) -> c_int {
    let ctx = unsafe { &mut *p_ctx.cast::<TrampolineCtx<'_>>() };
    let bytes = if n_token <= 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(token.cast::<u8>(), n_token as usize) }
    };
    let flags = TokenFlags::from_bits_truncate(tflags as u32);
    let tok = Token::borrowed(bytes, i_start as u32, i_end as u32, flags);
    match ctx.emit.emit(tok) {
        Ok(()) => SQLITE_OK,
        Err(err) => {
            ctx.err = Some(err);
            SQLITE_ERROR
        }
    }
}

impl TokenSource for HostParent {
    fn tokenize(&mut self, text: &[u8], flags: TokenizeFlags, emit: &mut dyn Emit) -> TokenizerResult<()> {
        let mut ctx = TrampolineCtx { emit, err: None };
        let rc = unsafe {
            (self.tokenizer.xTokenize)(
                self.instance,
                (&mut ctx as *mut TrampolineCtx<'_>).cast(),
                flags.bits() as c_int,
                text.as_ptr().cast::<c_char>(),
                text.len() as c_int,
                emit_trampoline,
            )
        };
        if rc == SQLITE_OK {
            Ok(())
        } else if let Some(err) = ctx.err {
            Err(err)
        } else {
            Err(TokenizerError::CallbackAborted(rc))
        }
    }
}

/// Resolves `name` through the host's `xFindTokenizer` and constructs an
/// instance of it with no further arguments, wrapping the result as a
/// [`TokenSource`]. Used for every filter's default parent resolution.
unsafe fn resolve_parent(api: *mut fts5_api, name: &str) -> TokenizerResult<HostParent> {
    let c_name = std::ffi::CString::new(name).map_err(|_| TokenizerError::InvalidArg(name.to_string()))?;
    let mut tokenizer = fts5_tokenizer {
        xCreate: no_op_xcreate,
        xDelete: no_op_xdelete,
        xTokenize: no_op_xtokenize,
    };
    let mut p_context: *mut c_void = ptr::null_mut();

    let rc = unsafe { ((*api).xFindTokenizer)(api, c_name.as_ptr(), &mut p_context, &mut tokenizer) };
    if rc != SQLITE_OK {
        return Err(TokenizerError::InvalidArg(format!("parent tokenizer '{name}' not found")));
    }

    let mut instance: *mut Fts5Tokenizer = ptr::null_mut();
    let rc = unsafe { (tokenizer.xCreate)(p_context, ptr::null_mut(), 0, &mut instance) };
    if rc != SQLITE_OK || instance.is_null() {
        return Err(TokenizerError::InvalidArg(format!("parent tokenizer '{name}' could not be created")));
    }

    Ok(HostParent { tokenizer, instance })
}

unsafe extern "C" fn no_op_xcreate(
    _p_ctx: *mut c_void,
    _az_arg: *mut *const c_char,
    _n_arg: c_int,
    _pp_out: *mut *mut Fts5Tokenizer,
) -> c_int {
    SQLITE_ERROR
}
unsafe extern "C" fn no_op_xdelete(_inst: *mut Fts5Tokenizer) {}
unsafe extern "C" fn no_op_xtokenize(
    _inst: *mut Fts5Tokenizer,
    _p_ctx: *mut c_void,
    _flags: c_int,
    _text: *const c_char,
    _n_text: c_int,
    _x_token: Fts5XToken,
) -> c_int {
    SQLITE_ERROR
}

/// Leaks `source` as an opaque `Fts5Tokenizer*` handed to the host.
fn leak_instance(source: DynSource) -> *mut Fts5Tokenizer {
    Box::into_raw(Box::new(source)).cast::<Fts5Tokenizer>()
}

/// Reclaims and drops an instance leaked by [`leak_instance`].
///
/// # Safety
/// `ptr` must have come from `leak_instance` and not already been freed.
unsafe fn reclaim_instance(ptr: *mut Fts5Tokenizer) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr.cast::<DynSource>()) });
    }
}

unsafe fn instance_ref<'a>(ptr: *mut Fts5Tokenizer) -> &'a mut DynSource {
    unsafe { &mut *ptr.cast::<DynSource>() }
}

/// Runs `instance`'s `tokenize` against the raw text/flags, marshaling
/// through `x_token` exactly like [`HostParent::tokenize`] does in reverse.
unsafe fn tokenize_via_ffi(
    instance: *mut Fts5Tokenizer,
    p_ctx: *mut c_void,
    tflags: c_int,
    text: *const c_char,
    n_text: c_int,
    x_token: Fts5XToken,
) -> c_int {
    let source = unsafe { instance_ref(instance) };
    let bytes = if n_text <= 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(text.cast::<u8>(), n_text as usize) }
    };
    let flags = TokenizeFlags::from_bits_truncate(tflags as u32);

    let result = source.tokenize(bytes, flags, &mut |tok: Token<'_>| {
        let c_bytes = tok.bytes.as_ref();
        let rc = unsafe {
            x_token(
                p_ctx,
                tok.flags.bits() as c_int,
                c_bytes.as_ptr().cast::<c_char>(),
                c_bytes.len() as c_int,
                tok.start as c_int,
                tok.end as c_int,
            )
        };
        if rc == SQLITE_OK {
            Ok(())
        } else {
            Err(TokenizerError::CallbackAborted(rc))
        }
    });
    result_to_rc(result)
}

macro_rules! define_tokenizer_entry_points {
    ($create_fn:ident, $delete_fn:ident, $tokenize_fn:ident, $build:expr) => {
        unsafe extern "C" fn $create_fn(
            p_ctx: *mut c_void,
            az_arg: *mut *const c_char,
            n_arg: c_int,
            pp_out: *mut *mut Fts5Tokenizer,
        ) -> c_int {
            let args = unsafe { read_args(az_arg, n_arg) };
            let api = p_ctx.cast::<fts5_api>();
            match ($build)(api, &args) {
                Ok(source) => {
                    unsafe { *pp_out = leak_instance(source) };
                    SQLITE_OK
                }
                Err(_) => SQLITE_ERROR,
            }
        }

        unsafe extern "C" fn $delete_fn(instance: *mut Fts5Tokenizer) {
            unsafe { reclaim_instance(instance) };
        }

        unsafe extern "C" fn $tokenize_fn(
            instance: *mut Fts5Tokenizer,
            p_ctx: *mut c_void,
            tflags: c_int,
            text: *const c_char,
            n_text: c_int,
            x_token: Fts5XToken,
        ) -> c_int {
            unsafe { tokenize_via_ffi(instance, p_ctx, tflags, text, n_text, x_token) }
        }
    };
}

define_tokenizer_entry_points!(stopwords_xcreate, stopwords_xdelete, stopwords_xtokenize, |api, args: &Vec<String>| {
    unsafe { build_stopwords(api, args) }
});
define_tokenizer_entry_points!(snowball_xcreate, snowball_xdelete, snowball_xtokenize, |api, args: &Vec<String>| {
    unsafe { build_snowball(api, args) }
});
define_tokenizer_entry_points!(phrases_xcreate, phrases_xdelete, phrases_xtokenize, |api, args: &Vec<String>| {
    unsafe { build_phrases(api, args) }
});
define_tokenizer_entry_points!(synonyms_xcreate, synonyms_xdelete, synonyms_xtokenize, |api, args: &Vec<String>| {
    unsafe { build_synonyms(api, args) }
});

unsafe fn build_stopwords(api: *mut fts5_api, args: &[String]) -> TokenizerResult<DynSource> {
    let (parent, _rest) = ParentRef::from_args(args);
    let parent_name = parent.resolve(config::default_parent_for("stopwords"));
    log::debug!("building stopwords tokenizer, parent='{parent_name}'");
    let db = shared_db();
    stopwords::ensure_table(&db.lock())?;
    crate::meta::ensure_table(&db.lock())?;
    let ctx = Arc::new(SharedContext::new(db, "stopwords"));

    if parent_name == "unicode61" {
        Ok(Box::new(StopwordFilter::new(UnicodeWordSplitter, ctx)))
    } else {
        let host_parent = unsafe { resolve_parent(api, parent_name)? };
        Ok(Box::new(StopwordFilter::new(host_parent, ctx)))
    }
}

unsafe fn build_snowball(api: *mut fts5_api, args: &[String]) -> TokenizerResult<DynSource> {
    let (parent, languages) = config::resolve_stemmer_args(args);
    let parent_name = parent.resolve(config::default_parent_for("snowball"));
    log::debug!("building snowball tokenizer, parent='{parent_name}', languages={languages:?}");

    if parent_name == "unicode61" {
        StemmerFilter::new(UnicodeWordSplitter, &languages).map(|f| Box::new(f) as DynSource)
    } else {
        let host_parent = unsafe { resolve_parent(api, parent_name)? };
        StemmerFilter::new(host_parent, &languages).map(|f| Box::new(f) as DynSource)
    }
}

unsafe fn build_phrases(api: *mut fts5_api, args: &[String]) -> TokenizerResult<DynSource> {
    let (parent, _rest) = ParentRef::from_args(args);
    let parent_name = parent.resolve(config::default_parent_for("phrases"));
    log::debug!("building phrases tokenizer, parent='{parent_name}'");
    let db = shared_db();
    phrases::ensure_table(&db.lock())?;
    crate::meta::ensure_table(&db.lock())?;
    let ctx = Arc::new(SharedContext::new(db, "phrases"));

    if parent_name == "unicode61" {
        Ok(Box::new(PhraseFilter::new(UnicodeWordSplitter, ctx)))
    } else {
        let host_parent = unsafe { resolve_parent(api, parent_name)? };
        Ok(Box::new(PhraseFilter::new(host_parent, ctx)))
    }
}

unsafe fn build_synonyms(api: *mut fts5_api, args: &[String]) -> TokenizerResult<DynSource> {
    let (parent, _rest) = ParentRef::from_args(args);
    let parent_name = parent.resolve(config::default_parent_for("synonyms"));
    log::debug!("building synonyms tokenizer, parent='{parent_name}'");
    let db = shared_db();
    synonyms::ensure_table(&db.lock())?;
    crate::meta::ensure_table(&db.lock())?;
    let ctx = Arc::new(SharedContext::new(db, "synonyms"));

    if parent_name == "unicode61" {
        Ok(Box::new(SynonymFilter::new(UnicodeWordSplitter, ctx)))
    } else {
        let host_parent = unsafe { resolve_parent(api, parent_name)? };
        Ok(Box::new(SynonymFilter::new(host_parent, ctx)))
    }
}

unsafe fn register(
    p_api: *mut fts5_api,
    name: &str,
    vtable: fts5_tokenizer,
) -> TokenizerResult<()> {
    let c_name = std::ffi::CString::new(name).expect("filter names never contain NUL");
    let rc = unsafe {
        ((*p_api).xCreateTokenizer)(
            p_api,
            c_name.as_ptr(),
            p_api.cast::<c_void>(),
            &vtable,
            None,
        )
    };
    if rc == SQLITE_OK {
        Ok(())
    } else {
        Err(TokenizerError::EngineMissing)
    }
}

/// Registers the `stopwords` tokenizer.
///
/// # Safety
/// `p_api` must be a valid, non-null `fts5_api*` obtained from the same
/// SQLite connection this extension is being loaded into, with a lifetime at
/// least as long as the connection itself — the standard guarantee SQLite
/// gives every loadable extension's `sqlite3_*_init` entry point.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlite3_stopwords_init(p_api: *mut fts5_api) -> c_int {
    if p_api.is_null() {
        return SQLITE_ERROR;
    }
    let vtable = fts5_tokenizer {
        xCreate: stopwords_xcreate,
        xDelete: stopwords_xdelete,
        xTokenize: stopwords_xtokenize,
    };
    result_to_rc(unsafe { register(p_api, "stopwords", vtable) })
}

/// Registers the `snowball` (stemmer) tokenizer.
///
/// # Safety
/// Same preconditions as [`sqlite3_stopwords_init`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlite3_snowball_init(p_api: *mut fts5_api) -> c_int {
    if p_api.is_null() {
        return SQLITE_ERROR;
    }
    let vtable = fts5_tokenizer {
        xCreate: snowball_xcreate,
        xDelete: snowball_xdelete,
        xTokenize: snowball_xtokenize,
    };
    result_to_rc(unsafe { register(p_api, "snowball", vtable) })
}

/// Registers the `phrases` tokenizer.
///
/// # Safety
/// Same preconditions as [`sqlite3_stopwords_init`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlite3_phrases_init(p_api: *mut fts5_api) -> c_int {
    if p_api.is_null() {
        return SQLITE_ERROR;
    }
    let vtable = fts5_tokenizer {
        xCreate: phrases_xcreate,
        xDelete: phrases_xdelete,
        xTokenize: phrases_xtokenize,
    };
    result_to_rc(unsafe { register(p_api, "phrases", vtable) })
}

/// Registers the `synonyms` tokenizer.
///
/// # Safety
/// Same preconditions as [`sqlite3_stopwords_init`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlite3_synonyms_init(p_api: *mut fts5_api) -> c_int {
    if p_api.is_null() {
        return SQLITE_ERROR;
    }
    let vtable = fts5_tokenizer {
        xCreate: synonyms_xcreate,
        xDelete: synonyms_xdelete,
        xTokenize: synonyms_xtokenize,
    };
    result_to_rc(unsafe { register(p_api, "synonyms", vtable) })
}
