//! Process-wide cache of spelling sessions, one per language.
use std::fmt;
use std::sync::{Arc, OnceLock};

use fnv::FnvHashMap;
use parking_lot::Mutex;

use crate::checker::SpellChecker;
use crate::error::{Error, Result};
use crate::loader::{FsLoader, ResourceLoader};
use crate::suggest::SuggestConfig;

type Slot = Arc<Mutex<Option<Arc<SpellChecker>>>>;

/// Opens each language at most once and hands out shared checkers.
///
/// The table lock is only held long enough to find a language's slot.
/// Loading happens under the slot's own lock, so two threads opening the
/// same language build it once, while other languages stay available.
pub struct Registry {
    loader: Box<dyn ResourceLoader>,
    config: SuggestConfig,
    slots: Mutex<FnvHashMap<String, Slot>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("loader", &self.loader)
            .field("config", &self.config)
            .field("languages", &self.loaded_languages())
            .finish()
    }
}

impl Registry {
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Registry {
            loader: Box::new(loader),
            config: SuggestConfig::default(),
            slots: Mutex::new(FnvHashMap::default()),
        }
    }

    /// Use `config` for the checkers this registry opens from now on.
    pub fn with_config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    /// Return the checker for `language`, loading it on first use.
    /// A failed load is not cached; the next call tries again.
    pub fn open(&self, language: &str) -> Result<Arc<SpellChecker>> {
        let slot = Arc::clone(self.slots.lock().entry(language.to_string()).or_default());
        let mut checker = slot.lock();
        if let Some(checker) = checker.as_ref() {
            return Ok(Arc::clone(checker));
        }
        let loaded = Arc::new(SpellChecker::load(
            language,
            self.loader.as_ref(),
            self.config.clone(),
        )?);
        *checker = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Return the checker for a language that was already opened.
    pub fn get(&self, language: &str) -> Result<Arc<SpellChecker>> {
        let slot = self.slots.lock().get(language).cloned();
        if let Some(slot) = slot {
            if let Some(checker) = slot.lock().as_ref() {
                return Ok(Arc::clone(checker));
            }
        }
        Err(Error::DictionaryNotLoaded {
            language: language.to_string(),
        })
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        let slots: Vec<(String, Slot)> = self
            .slots
            .lock()
            .iter()
            .map(|(lang, slot)| (lang.clone(), Arc::clone(slot)))
            .collect();
        let mut languages: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| slot.try_lock().map_or(false, |c| c.is_some()))
            .map(|(lang, _)| lang)
            .collect();
        languages.sort();
        languages
    }
}

/// The registry behind the free functions `open` and `check_sentence`.
/// It searches the default dictionary path.
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(|| Registry::new(FsLoader::default()))
}
