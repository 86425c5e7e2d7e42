//! Operator-Pool – Angemeldete Operatoren und ihre Verfuegbarkeit
//!
//! Operatoren melden sich mit einer Kennung aus der statischen
//! Erlaubnisliste an. Pro Kennung darf zu jedem Zeitpunkt hoechstens eine
//! live Verbindung angemeldet sein; ein zweiter Anmeldeversuch wird
//! abgelehnt solange die erste Verbindung lebt.
//!
//! ## Auswahlpolitik
//! `verfuegbaren_beanspruchen` nimmt den ERSTEN verfuegbaren Eintrag in
//! Anmeldereihenfolge. Diese Reihenfolge ist bewusst KEINE Zusage an die
//! Aufrufer – sie darf sich in Zukunft aendern und traegt keine
//! Prioritaets-Semantik.
//!
//! ## Atomaritaet
//! Suchen und Besetzen passieren unter einem Lock: zwei Offers die um den
//! letzten freien Operator rennen bekommen deterministisch genau einen
//! Gewinner, der andere sieht keinen Treffer.

use hotline_core::error::HotlineError;
use hotline_core::types::{ConnectionId, OperatorId};
use parking_lot::Mutex;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// OperatorEntry
// ---------------------------------------------------------------------------

/// Eintrag eines angemeldeten Operators
#[derive(Debug, Clone)]
pub struct OperatorEntry {
    /// Kennung aus der Erlaubnisliste
    pub kennung: OperatorId,
    /// Handle der live Verbindung
    pub handle: ConnectionId,
    /// Verfuegbar fuer neue Vermittlungen
    pub verfuegbar: bool,
}

// ---------------------------------------------------------------------------
// OperatorPool
// ---------------------------------------------------------------------------

/// Pool aller angemeldeten Operatoren
///
/// Thread-safe via Arc + Mutex. Clone teilt den inneren Zustand.
/// Die Erlaubnisliste ist nach dem Start unveraenderlich.
#[derive(Clone)]
pub struct OperatorPool {
    inner: Arc<OperatorPoolInner>,
}

struct OperatorPoolInner {
    /// Statische Erlaubnisliste (fixiert beim Start)
    erlaubte: Vec<OperatorId>,
    /// Angemeldete Operatoren in Anmeldereihenfolge
    eintraege: Mutex<Vec<OperatorEntry>>,
}

impl OperatorPool {
    /// Erstellt einen neuen Pool mit der gegebenen Erlaubnisliste
    pub fn neu(erlaubte: Vec<OperatorId>) -> Self {
        Self {
            inner: Arc::new(OperatorPoolInner {
                erlaubte,
                eintraege: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Meldet einen Operator an
    ///
    /// Die Kennung muss in der Erlaubnisliste stehen und darf noch keinen
    /// live Eintrag haben. Bei Erfolg entsteht ein Eintrag mit
    /// Verfuegbarkeit `true`.
    pub fn anmelden(
        &self,
        kennung: &OperatorId,
        handle: ConnectionId,
    ) -> Result<(), HotlineError> {
        if !self.inner.erlaubte.contains(kennung) {
            tracing::warn!(operator = %kennung, "Anmeldung mit unbekannter Kennung abgelehnt");
            return Err(HotlineError::UngueltigeKennung(kennung.as_str().into()));
        }

        let mut eintraege = self.inner.eintraege.lock();
        if eintraege.iter().any(|e| &e.kennung == kennung) {
            tracing::warn!(operator = %kennung, "Kennung bereits angemeldet");
            return Err(HotlineError::KennungBereitsAktiv(kennung.as_str().into()));
        }

        eintraege.push(OperatorEntry {
            kennung: kennung.clone(),
            handle,
            verfuegbar: true,
        });
        tracing::info!(operator = %kennung, verbindung = %handle, "Operator angemeldet");
        Ok(())
    }

    /// Gibt die Kennung irgendeines verfuegbaren Operators zurueck
    ///
    /// Nur-Lese-Variante ohne Besetzen; fuer die Vermittlung selbst
    /// `verfuegbaren_beanspruchen` verwenden.
    pub fn verfuegbare_kennung(&self) -> Option<OperatorId> {
        self.inner
            .eintraege
            .lock()
            .iter()
            .find(|e| e.verfuegbar)
            .map(|e| e.kennung.clone())
    }

    /// Sucht einen verfuegbaren Operator und besetzt ihn atomar
    ///
    /// Suchen und Besetzen unter einem Lock: von mehreren gleichzeitigen
    /// Aufrufen bekommt jeder einen ANDEREN Operator oder None.
    pub fn verfuegbaren_beanspruchen(&self) -> Option<(OperatorId, ConnectionId)> {
        let mut eintraege = self.inner.eintraege.lock();
        let eintrag = eintraege.iter_mut().find(|e| e.verfuegbar)?;
        eintrag.verfuegbar = false;
        tracing::debug!(operator = %eintrag.kennung, "Operator besetzt");
        Some((eintrag.kennung.clone(), eintrag.handle))
    }

    /// Markiert einen Operator als besetzt
    ///
    /// Idempotent; No-Op wenn die Kennung nicht angemeldet ist.
    pub fn besetzt_setzen(&self, kennung: &OperatorId) {
        let mut eintraege = self.inner.eintraege.lock();
        if let Some(eintrag) = eintraege.iter_mut().find(|e| &e.kennung == kennung) {
            eintrag.verfuegbar = false;
        }
    }

    /// Markiert einen Operator wieder als verfuegbar
    ///
    /// Idempotent; No-Op wenn die Kennung nicht angemeldet ist.
    pub fn frei_geben(&self, kennung: &OperatorId) {
        let mut eintraege = self.inner.eintraege.lock();
        if let Some(eintrag) = eintraege.iter_mut().find(|e| &e.kennung == kennung) {
            if !eintrag.verfuegbar {
                eintrag.verfuegbar = true;
                tracing::info!(operator = %kennung, "Operator wieder verfuegbar");
            }
        }
    }

    /// Entfernt den Eintrag mit dem gegebenen Verbindungs-Handle
    ///
    /// Wird beim Trennen aufgerufen. Gibt die Kennung des entfernten
    /// Eintrags zurueck, None wenn das Handle keinem Operator gehoerte.
    pub fn nach_handle_entfernen(&self, handle: &ConnectionId) -> Option<OperatorId> {
        let mut eintraege = self.inner.eintraege.lock();
        let position = eintraege.iter().position(|e| &e.handle == handle)?;
        let eintrag = eintraege.remove(position);
        tracing::info!(operator = %eintrag.kennung, "Operator abgemeldet (Verbindung getrennt)");
        Some(eintrag.kennung)
    }

    /// Gibt das Verbindungs-Handle eines angemeldeten Operators zurueck
    pub fn handle_von(&self, kennung: &OperatorId) -> Option<ConnectionId> {
        self.inner
            .eintraege
            .lock()
            .iter()
            .find(|e| &e.kennung == kennung)
            .map(|e| e.handle)
    }

    /// Prueft ob eine Kennung aktuell angemeldet ist
    pub fn ist_angemeldet(&self, kennung: &OperatorId) -> bool {
        self.inner
            .eintraege
            .lock()
            .iter()
            .any(|e| &e.kennung == kennung)
    }

    /// Gibt die Anzahl der angemeldeten Operatoren zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.eintraege.lock().len()
    }

    /// Gibt die Anzahl der verfuegbaren Operatoren zurueck
    pub fn verfuegbare_anzahl(&self) -> usize {
        self.inner
            .eintraege
            .lock()
            .iter()
            .filter(|e| e.verfuegbar)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool(kennungen: &[&str]) -> OperatorPool {
        OperatorPool::neu(kennungen.iter().map(|k| OperatorId::neu(*k)).collect())
    }

    #[test]
    fn anmelden_mit_gueltiger_kennung() {
        let pool = test_pool(&["op1", "op2"]);
        let handle = ConnectionId::new();

        pool.anmelden(&"op1".into(), handle).unwrap();
        assert!(pool.ist_angemeldet(&"op1".into()));
        assert_eq!(pool.anzahl(), 1);
        assert_eq!(pool.verfuegbare_anzahl(), 1);
        assert_eq!(pool.handle_von(&"op1".into()), Some(handle));
    }

    #[test]
    fn anmelden_mit_unbekannter_kennung_abgelehnt() {
        let pool = test_pool(&["op1"]);

        let fehler = pool
            .anmelden(&"fremd".into(), ConnectionId::new())
            .unwrap_err();
        assert_eq!(fehler, HotlineError::UngueltigeKennung("fremd".into()));
        assert_eq!(pool.anzahl(), 0);
    }

    #[test]
    fn doppelte_anmeldung_abgelehnt() {
        let pool = test_pool(&["op1"]);

        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();
        let fehler = pool
            .anmelden(&"op1".into(), ConnectionId::new())
            .unwrap_err();
        assert_eq!(fehler, HotlineError::KennungBereitsAktiv("op1".into()));

        // Hoechstens ein live Eintrag pro Kennung
        assert_eq!(pool.anzahl(), 1);
    }

    #[test]
    fn nach_entfernen_ist_kennung_wieder_frei() {
        let pool = test_pool(&["op1"]);
        let handle = ConnectionId::new();

        pool.anmelden(&"op1".into(), handle).unwrap();
        assert_eq!(pool.nach_handle_entfernen(&handle), Some("op1".into()));
        assert!(!pool.ist_angemeldet(&"op1".into()));

        // Neue Anmeldung mit derselben Kennung ist jetzt erlaubt
        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();
    }

    #[test]
    fn beanspruchen_besetzt_atomar() {
        let pool = test_pool(&["op1"]);
        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();

        let (kennung, _) = pool.verfuegbaren_beanspruchen().expect("op1 muss frei sein");
        assert_eq!(kennung, "op1".into());
        assert_eq!(pool.verfuegbare_anzahl(), 0);

        // Zweiter Versuch geht leer aus
        assert!(pool.verfuegbaren_beanspruchen().is_none());
    }

    #[test]
    fn beanspruchen_unter_last_genau_ein_gewinner_pro_operator() {
        let pool = test_pool(&["op1", "op2", "op3"]);
        for kennung in ["op1", "op2", "op3"] {
            pool.anmelden(&kennung.into(), ConnectionId::new()).unwrap();
        }

        // 8 Threads rennen um 3 Operatoren
        let gewinner: Vec<_> = std::thread::scope(|scope| {
            (0..8)
                .map(|_| {
                    let pool = pool.clone();
                    scope.spawn(move || pool.verfuegbaren_beanspruchen())
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        let erfolge: Vec<_> = gewinner.into_iter().flatten().collect();
        assert_eq!(erfolge.len(), 3, "Genau drei Beanspruchungen duerfen gelingen");

        // Kein Operator doppelt vergeben
        let mut kennungen: Vec<_> = erfolge.iter().map(|(k, _)| k.clone()).collect();
        kennungen.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kennungen.dedup();
        assert_eq!(kennungen.len(), 3);
    }

    #[test]
    fn frei_geben_ist_idempotent() {
        let pool = test_pool(&["op1"]);
        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();
        pool.verfuegbaren_beanspruchen().unwrap();

        pool.frei_geben(&"op1".into());
        pool.frei_geben(&"op1".into());
        assert_eq!(pool.verfuegbare_anzahl(), 1);

        // Unbekannte Kennung: No-Op
        pool.frei_geben(&"fremd".into());
        pool.besetzt_setzen(&"fremd".into());
    }

    #[test]
    fn freigegebener_operator_wieder_vermittelbar() {
        let pool = test_pool(&["op1"]);
        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();

        pool.verfuegbaren_beanspruchen().unwrap();
        assert!(pool.verfuegbaren_beanspruchen().is_none());

        pool.frei_geben(&"op1".into());
        let (kennung, _) = pool.verfuegbaren_beanspruchen().expect("op1 wieder frei");
        assert_eq!(kennung, "op1".into());
    }

    #[test]
    fn verfuegbare_kennung_nimmt_erste_in_anmeldereihenfolge() {
        let pool = test_pool(&["op1", "op2"]);
        pool.anmelden(&"op2".into(), ConnectionId::new()).unwrap();
        pool.anmelden(&"op1".into(), ConnectionId::new()).unwrap();

        // op2 hat sich zuerst angemeldet
        assert_eq!(pool.verfuegbare_kennung(), Some("op2".into()));
    }
}
