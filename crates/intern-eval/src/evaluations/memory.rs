use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{EvaluationId, EvaluationRecord, FormDefinition, FormId, Intern, InternId};
use super::repository::{EvaluationRepository, RepositoryError, RosterRepository};

/// Process-local evaluation store keyed by id, ordered by insertion id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEvaluationRepository {
    records: Arc<Mutex<BTreeMap<EvaluationId, EvaluationRecord>>>,
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.contains_key(&record.id)
            || guard
                .values()
                .any(|stored| stored.form == record.form && stored.intern == record.intern);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(stored) => {
                *stored = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_form(&self, form: &FormId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.form == form)
            .cloned()
            .collect())
    }

    fn remove(&self, id: &EvaluationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn remove_for_form(&self, form: &FormId) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|_, record| &record.form != form);
        Ok(before - guard.len())
    }
}

/// Process-local forms and interns.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRosterRepository {
    forms: Arc<Mutex<BTreeMap<FormId, FormDefinition>>>,
    interns: Arc<Mutex<BTreeMap<InternId, Intern>>>,
}

impl RosterRepository for InMemoryRosterRepository {
    fn insert_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let mut guard = self.forms.lock().expect("form mutex poisoned");
        if guard.contains_key(&form.id) || guard.values().any(|stored| stored.name == form.name) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    fn update_form(&self, form: FormDefinition) -> Result<(), RepositoryError> {
        let mut guard = self.forms.lock().expect("form mutex poisoned");
        match guard.get_mut(&form.id) {
            Some(stored) => {
                *stored = form;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("form mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("form mutex poisoned");
        let mut forms: Vec<_> = guard.values().cloned().collect();
        forms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(forms)
    }

    fn remove_form(&self, id: &FormId) -> Result<(), RepositoryError> {
        let mut guard = self.forms.lock().expect("form mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn insert_intern(&self, intern: Intern) -> Result<Intern, RepositoryError> {
        let mut guard = self.interns.lock().expect("intern mutex poisoned");
        let duplicate = guard.contains_key(&intern.id)
            || guard
                .values()
                .any(|stored| stored.email.eq_ignore_ascii_case(&intern.email));
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(intern.id.clone(), intern.clone());
        Ok(intern)
    }

    fn fetch_intern(&self, id: &InternId) -> Result<Option<Intern>, RepositoryError> {
        let guard = self.interns.lock().expect("intern mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn interns(&self) -> Result<Vec<Intern>, RepositoryError> {
        let guard = self.interns.lock().expect("intern mutex poisoned");
        let mut interns: Vec<_> = guard.values().cloned().collect();
        interns.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(interns)
    }
}
