use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::game::players::LedgerError;
use crate::types::{FieldKind, PropertySet};

pub const BOARD_SIZE: usize = 40;
pub const PROPERTY_COUNT: usize = 28;

pub type FieldIndex = usize;
pub type PropertyIndex = usize;

/// An ownable square together with its mutable ownership state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub field_index: FieldIndex,
    pub property_index: PropertyIndex,
    pub name: String,
    pub price: i64,
    pub house_price: i64,
    pub owner: Option<usize>,
    pub is_mortgaged: bool,
    pub can_build_house: bool,
    pub houses: u8,
    pub set: PropertySet,
}

impl Property {
    pub fn new(
        field_index: FieldIndex,
        property_index: PropertyIndex,
        name: impl Into<String>,
        price: i64,
        house_price: i64,
        set: PropertySet,
    ) -> Result<Self, LedgerError> {
        if price < 0 || house_price < 0 {
            return Err(LedgerError::NegativePrice {
                property: property_index,
                price: price.min(house_price),
            });
        }
        Ok(Self {
            field_index,
            property_index,
            name: name.into(),
            price,
            house_price,
            owner: None,
            is_mortgaged: false,
            can_build_house: set.is_color(),
            houses: 0,
            set,
        })
    }

    pub fn is_owned_by(&self, player: usize) -> bool {
        self.owner == Some(player)
    }

    /// Cash raised by mortgaging, and the base of the net-worth valuation.
    pub fn mortgage_value(&self) -> i64 {
        self.price / 2
    }

    /// Cost of lifting a mortgage: 110% of list price, rounded toward zero.
    pub fn buyout_cost(&self) -> i64 {
        self.price * 11 / 10
    }

    pub fn house_refund(&self) -> i64 {
        self.house_price / 2
    }

    /// Liquidation value counted towards net worth: half the list price plus
    /// half the house price per house, nothing for a mortgaged property.
    pub fn liquidation_value(&self) -> i64 {
        if self.is_mortgaged {
            return 0;
        }
        self.mortgage_value() + i64::from(self.houses) * self.house_refund()
    }

    /// Return the property to the bank with no improvements.
    pub fn reset(&mut self) {
        self.owner = None;
        self.is_mortgaged = false;
        self.houses = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    NoAction {
        index: FieldIndex,
        name: &'static str,
    },
    Property {
        index: FieldIndex,
        property: PropertyIndex,
    },
    Tax {
        index: FieldIndex,
        name: &'static str,
        amount: i64,
    },
    Chest {
        index: FieldIndex,
    },
    Chance {
        index: FieldIndex,
    },
    GoToJail {
        index: FieldIndex,
    },
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::NoAction { .. } => FieldKind::NoAction,
            Field::Property { .. } => FieldKind::Property,
            Field::Tax { .. } => FieldKind::Tax,
            Field::Chest { .. } => FieldKind::Chest,
            Field::Chance { .. } => FieldKind::Chance,
            Field::GoToJail { .. } => FieldKind::GoToJail,
        }
    }

    pub fn index(&self) -> FieldIndex {
        match self {
            Field::NoAction { index, .. }
            | Field::Property { index, .. }
            | Field::Tax { index, .. }
            | Field::Chest { index }
            | Field::Chance { index }
            | Field::GoToJail { index } => *index,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::NoAction { name, .. } | Field::Tax { name, .. } => write!(f, "{name}"),
            Field::Property { property, .. } => write!(f, "{}", PROPERTY_TABLE[*property].name),
            Field::Chest { .. } => write!(f, "Community Chest"),
            Field::Chance { .. } => write!(f, "Chance"),
            Field::GoToJail { .. } => write!(f, "Go To Jail"),
        }
    }
}

struct PropertyTemplate {
    field_index: FieldIndex,
    name: &'static str,
    price: i64,
    house_price: i64,
    set: PropertySet,
    rents: &'static [i64],
}

const fn template(
    field_index: FieldIndex,
    name: &'static str,
    price: i64,
    house_price: i64,
    set: PropertySet,
    rents: &'static [i64],
) -> PropertyTemplate {
    PropertyTemplate {
        field_index,
        name,
        price,
        house_price,
        set,
        rents,
    }
}

const RAILROAD_RENTS: &[i64] = &[25, 50, 100, 200];
// Multipliers applied to the dice total.
const UTILITY_RENTS: &[i64] = &[4, 10];

static PROPERTY_TABLE: Lazy<Vec<PropertyTemplate>> = Lazy::new(|| {
    use PropertySet::*;
    vec![
        template(1, "Mediterranean Avenue", 60, 50, Brown, &[2, 4, 10, 30, 90, 160, 250]),
        template(3, "Baltic Avenue", 60, 50, Brown, &[4, 8, 20, 60, 180, 320, 450]),
        template(5, "Reading Railroad", 200, 0, Railroad, RAILROAD_RENTS),
        template(6, "Oriental Avenue", 100, 50, LightBlue, &[6, 12, 30, 90, 270, 400, 550]),
        template(8, "Vermont Avenue", 100, 50, LightBlue, &[6, 12, 30, 90, 270, 400, 550]),
        template(9, "Connecticut Avenue", 120, 50, LightBlue, &[8, 16, 40, 100, 300, 450, 600]),
        template(11, "St. Charles Place", 140, 100, Pink, &[10, 20, 50, 150, 450, 625, 750]),
        template(12, "Electric Company", 150, 0, Utility, UTILITY_RENTS),
        template(13, "States Avenue", 140, 100, Pink, &[10, 20, 50, 150, 450, 625, 750]),
        template(14, "Virginia Avenue", 160, 100, Pink, &[12, 24, 60, 180, 500, 700, 900]),
        template(15, "Pennsylvania Railroad", 200, 0, Railroad, RAILROAD_RENTS),
        template(16, "St. James Place", 180, 100, Orange, &[14, 28, 70, 200, 550, 750, 950]),
        template(18, "Tennessee Avenue", 180, 100, Orange, &[14, 28, 70, 200, 550, 750, 950]),
        template(19, "New York Avenue", 200, 100, Orange, &[16, 32, 80, 220, 600, 800, 1000]),
        template(21, "Kentucky Avenue", 220, 150, Red, &[18, 36, 90, 250, 700, 875, 1050]),
        template(23, "Indiana Avenue", 220, 150, Red, &[18, 36, 90, 250, 700, 875, 1050]),
        template(24, "Illinois Avenue", 240, 150, Red, &[20, 40, 100, 300, 750, 925, 1100]),
        template(25, "B&O Railroad", 200, 0, Railroad, RAILROAD_RENTS),
        template(26, "Atlantic Avenue", 260, 150, Yellow, &[22, 44, 110, 330, 800, 975, 1150]),
        template(27, "Ventnor Avenue", 260, 150, Yellow, &[22, 44, 110, 330, 800, 975, 1150]),
        template(28, "Water Works", 150, 0, Utility, UTILITY_RENTS),
        template(29, "Marvin Gardens", 280, 150, Yellow, &[24, 48, 120, 360, 850, 1025, 1200]),
        template(31, "Pacific Avenue", 300, 200, Green, &[26, 52, 130, 390, 900, 1100, 1275]),
        template(32, "North Carolina Avenue", 300, 200, Green, &[26, 52, 130, 390, 900, 1100, 1275]),
        template(34, "Pennsylvania Avenue", 320, 200, Green, &[28, 56, 150, 450, 1000, 1200, 1400]),
        template(35, "Short Line", 200, 0, Railroad, RAILROAD_RENTS),
        template(37, "Park Place", 350, 200, DarkBlue, &[35, 70, 175, 500, 1100, 1300, 1500]),
        template(39, "Boardwalk", 400, 200, DarkBlue, &[50, 100, 200, 600, 1400, 1700, 2000]),
    ]
});

/// Static description of the 40-field loop: field kinds, set membership and
/// the rent table. Mutable property state lives on the game.
#[derive(Debug, Clone)]
pub struct Board {
    fields: Vec<Field>,
    sets: BTreeMap<PropertySet, Vec<PropertyIndex>>,
    rents: Vec<&'static [i64]>,
    properties: Vec<Property>,
}

impl Board {
    pub fn standard() -> Result<Self, LedgerError> {
        let mut properties = Vec::with_capacity(PROPERTY_COUNT);
        let mut sets: BTreeMap<PropertySet, Vec<PropertyIndex>> = BTreeMap::new();
        let mut rents = Vec::with_capacity(PROPERTY_COUNT);
        for (idx, tpl) in PROPERTY_TABLE.iter().enumerate() {
            properties.push(Property::new(
                tpl.field_index,
                idx,
                tpl.name,
                tpl.price,
                tpl.house_price,
                tpl.set,
            )?);
            sets.entry(tpl.set).or_default().push(idx);
            rents.push(tpl.rents);
        }

        let mut fields: Vec<Option<Field>> = vec![None; BOARD_SIZE];
        for property in &properties {
            fields[property.field_index] = Some(Field::Property {
                index: property.field_index,
                property: property.property_index,
            });
        }
        let specials = [
            Field::NoAction { index: 0, name: "GO" },
            Field::Chest { index: 2 },
            Field::Tax { index: 4, name: "Income Tax", amount: 200 },
            Field::Chance { index: 7 },
            Field::NoAction { index: 10, name: "Jail / Just Visiting" },
            Field::Chest { index: 17 },
            Field::NoAction { index: 20, name: "Free Parking" },
            Field::Chance { index: 22 },
            Field::GoToJail { index: 30 },
            Field::Chest { index: 33 },
            Field::Chance { index: 36 },
            Field::Tax { index: 38, name: "Luxury Tax", amount: 100 },
        ];
        for field in specials {
            let index = field.index();
            fields[index] = Some(field);
        }
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| field.unwrap_or(Field::NoAction { index, name: "Empty" }))
            .collect();

        Ok(Self {
            fields,
            sets,
            rents,
            properties,
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: FieldIndex) -> &Field {
        &self.fields[index % self.fields.len()]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set_members(&self, set: PropertySet) -> &[PropertyIndex] {
        self.sets.get(&set).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sets(&self) -> impl Iterator<Item = (PropertySet, &[PropertyIndex])> + '_ {
        self.sets.iter().map(|(set, members)| (*set, members.as_slice()))
    }

    pub fn rents(&self, property: PropertyIndex) -> &'static [i64] {
        self.rents[property]
    }

    /// Fresh, unowned copies of every property.
    pub fn initial_properties(&self) -> Vec<Property> {
        self.properties.clone()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::types::FieldKind;

    #[test]
    fn standard_board_has_forty_fields_in_order() {
        let board = Board::standard().unwrap();
        assert_eq!(board.len(), BOARD_SIZE);
        for (idx, field) in board.fields().iter().enumerate() {
            assert_eq!(field.index(), idx);
        }
        assert_eq!(board.field(30).kind(), FieldKind::GoToJail);
        assert_eq!(board.field(4), &Field::Tax { index: 4, name: "Income Tax", amount: 200 });
        assert_eq!(board.field(40).index(), 0);
        assert!(board.fields().iter().all(|f| !matches!(f, Field::NoAction { name: "Empty", .. })));
    }

    #[test]
    fn property_groups_match_classic_layout() {
        let board = Board::standard().unwrap();
        assert_eq!(board.initial_properties().len(), PROPERTY_COUNT);
        let sizes: Vec<usize> = PropertySet::iter()
            .map(|set| board.set_members(set).len())
            .collect();
        assert_eq!(sizes, vec![2, 3, 3, 3, 3, 3, 3, 2, 4, 2]);
        assert_eq!(board.set_members(PropertySet::Utility), &[7, 20]);
    }

    #[test]
    fn rent_tiers_per_group() {
        let board = Board::standard().unwrap();
        for property in board.initial_properties() {
            let tiers = board.rents(property.property_index).len();
            match property.set {
                PropertySet::Railroad => assert_eq!(tiers, 4),
                PropertySet::Utility => assert_eq!(tiers, 2),
                _ => assert_eq!(tiers, 7),
            }
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Property::new(1, 0, "Broken", -1, 50, PropertySet::Brown).unwrap_err();
        assert!(matches!(err, LedgerError::NegativePrice { property: 0, .. }));
    }

    #[test]
    fn buyout_rounds_toward_zero() {
        let mut property = Property::new(1, 0, "Test", 100, 50, PropertySet::Brown).unwrap();
        assert_eq!(property.buyout_cost(), 110);
        property.price = 105;
        assert_eq!(property.buyout_cost(), 115);
    }

    #[test]
    fn liquidation_value_ignores_mortgaged() {
        let mut property = Property::new(1, 0, "Test", 100, 50, PropertySet::Brown).unwrap();
        property.houses = 2;
        assert_eq!(property.liquidation_value(), 50 + 2 * 25);
        property.houses = 0;
        property.is_mortgaged = true;
        assert_eq!(property.liquidation_value(), 0);
    }
}
