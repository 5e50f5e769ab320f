use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use rust_decimal::Decimal;

use crate::atom::Atom;
use crate::design::Design;
use crate::error::{CatalogError, CatalogResult};
use crate::party::Party;

/// An immutable snapshot of everything the planner can draw on: the
/// parties, the designs, and the price map used to reduce cost
/// expressions to numbers. Iteration order over `parties` and `designs`
/// is insertion order — this is the stable source of determinism for
/// enumeration (§4.1).
///
/// Parties and designs are kept behind `Rc` so that a `SupplyTree` can hold
/// on to the party/design it used without copying it, matching the "small
/// reference-counted handle" tree-sharing design (§9).
#[derive(Debug, Clone)]
pub struct Catalog {
    parties: Vec<Rc<Party>>,
    designs: Vec<Rc<Design>>,
    price_map: HashMap<String, Decimal>,
}

impl Catalog {
    pub fn try_new(
        parties: Vec<Party>,
        designs: Vec<Design>,
        price_map: HashMap<String, Decimal>,
    ) -> CatalogResult<Self> {
        validate(&parties, &designs)?;
        tracing::info!(
            party_count = parties.len(),
            design_count = designs.len(),
            "assembled catalog"
        );
        Ok(Self {
            parties: parties.into_iter().map(Rc::new).collect(),
            designs: designs.into_iter().map(Rc::new).collect(),
            price_map,
        })
    }

    pub fn parties(&self) -> &[Rc<Party>] {
        &self.parties
    }

    pub fn designs(&self) -> &[Rc<Design>] {
        &self.designs
    }

    pub fn price_map(&self) -> &HashMap<String, Decimal> {
        &self.price_map
    }

    pub fn suppliers_of<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = Rc<Party>> + 'a {
        self.parties
            .iter()
            .filter(move |p| p.supplies.contains(atom))
            .cloned()
    }

    pub fn inventories_of<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = Rc<Party>> + 'a {
        self.parties
            .iter()
            .filter(move |p| p.inventory.contains(atom))
            .cloned()
    }

    pub fn designs_for<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = Rc<Design>> + 'a {
        self.designs
            .iter()
            .filter(move |d| d.product == *atom)
            .cloned()
    }

    pub fn compatible_makers<'a>(&'a self, design: &'a Design) -> impl Iterator<Item = Rc<Party>> + 'a {
        self.parties
            .iter()
            .filter(move |p| p.has_tools_for(&design.tools))
            .cloned()
    }

    /// Every atom reachable from this catalog's parties and designs:
    /// supplies, inventory, tools, products, and bom entries. Grounded on
    /// the reference's `goodTypes(network)` helper (§11).
    pub fn atoms(&self) -> BTreeSet<Atom> {
        let mut out = BTreeSet::new();
        for p in &self.parties {
            out.extend(p.supplies.iter().cloned());
            out.extend(p.tools.iter().cloned());
            out.extend(p.inventory.iter().cloned());
        }
        for d in &self.designs {
            out.insert(d.product.clone());
            out.extend(d.bom.iter().cloned());
            out.extend(d.tools.iter().cloned());
            out.extend(d.byproducts.iter().cloned());
        }
        out
    }

    /// Combines this catalog with `other`, re-running assembly validation
    /// over the union. Insertion order is `self` then `other`, so the
    /// combined catalog's determinism source (§4.1) is well defined.
    /// Grounded on the reference's `unionSupplyNetworks` helper (§11).
    pub fn union(&self, other: &Catalog) -> CatalogResult<Catalog> {
        let parties: Vec<Party> = self
            .parties
            .iter()
            .chain(other.parties.iter())
            .map(|p| (**p).clone())
            .collect();
        let designs: Vec<Design> = self
            .designs
            .iter()
            .chain(other.designs.iter())
            .map(|d| (**d).clone())
            .collect();
        let mut price_map = self.price_map.clone();
        price_map.extend(other.price_map.clone());
        Catalog::try_new(parties, designs, price_map)
    }
}

fn validate(parties: &[Party], designs: &[Design]) -> CatalogResult<()> {
    let mut seen_designs = HashSet::new();
    for d in designs {
        if d.name.is_empty() {
            return Err(CatalogError::EmptyDesignName);
        }
        if !seen_designs.insert(d.name.clone()) {
            return Err(CatalogError::DuplicateDesignName(d.name.clone()));
        }
        if d.bom.contains(&d.product) {
            return Err(CatalogError::SelfReferentialDesign(d.name.clone()));
        }
    }

    let mut seen_parties = HashSet::new();
    for p in parties {
        if p.name.is_empty() {
            return Err(CatalogError::EmptyPartyName);
        }
        if !seen_parties.insert(p.name.clone()) {
            return Err(CatalogError::DuplicatePartyName(p.name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    fn raw_party(name: &str, supplies: &str) -> Party {
        Party::new(name, [Atom::id(supplies)], [], [])
    }

    #[test]
    fn suppliers_of_respects_insertion_order() {
        let catalog = Catalog::try_new(
            vec![raw_party("Sx1", "x"), raw_party("Sx2", "x")],
            vec![],
            HashMap::new(),
        )
        .unwrap();
        let names: Vec<_> = catalog
            .suppliers_of(&Atom::id("x"))
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Sx1", "Sx2"]);
    }

    #[test]
    fn rejects_self_referential_design_at_assembly() {
        let d = Design {
            name: "loop".into(),
            product: Atom::id("chair"),
            bom: [Atom::id("chair")].into_iter().collect(),
            tools: Default::default(),
            byproducts: Default::default(),
            cost_expr: Expression::konst(0),
        };
        let err = Catalog::try_new(vec![], vec![d], HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::SelfReferentialDesign(_)));
    }

    #[test]
    fn rejects_duplicate_design_names() {
        let d1 = Design::new("c1", Atom::id("chair"), [], [], [], Expression::konst(0)).unwrap();
        let d2 = Design::new("c1", Atom::id("stool"), [], [], [], Expression::konst(0)).unwrap();
        let err = Catalog::try_new(vec![], vec![d1, d2], HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateDesignName(_)));
    }

    #[test]
    fn union_combines_in_order() {
        let a = Catalog::try_new(vec![raw_party("Sx1", "x")], vec![], HashMap::new()).unwrap();
        let b = Catalog::try_new(vec![raw_party("Sx2", "x")], vec![], HashMap::new()).unwrap();
        let c = a.union(&b).unwrap();
        let names: Vec<_> = c.parties().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Sx1", "Sx2"]);
    }
}
